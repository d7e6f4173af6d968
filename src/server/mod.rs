//! Line-protocol server.
//!
//! This module provides:
//! - Request and response types for newline-delimited JSON
//! - Request dispatch against shared state
//! - A transport generic over the reader and writer
//! - [`ScoringServer`], which wires everything together over stdio
//!
//! # Protocol
//!
//! ```text
//! {"op":"enroll","learner_id":"l-1"}
//! {"op":"submit","learner_id":"l-1","assessment_type":"Fin","answers":"[\"b\"]","score":"88"}
//! {"op":"get_learner","learner_id":"l-1"}
//! ```
//!
//! Each request line yields one response line, `{"ok":true,...}` or
//! `{"ok":false,"error":{"kind":..,"message":..}}`.
//!
//! # Example
//!
//! ```no_run
//! use assessment_scoring::config::Config;
//! use assessment_scoring::server::ScoringServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ScoringServer::new(Config::default());
//! server.run_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod handler;
mod requests;
mod responses;
mod service;
mod transport;
mod types;

pub use handler::RequestHandler;
pub use requests::{Request, ScoreField};
pub use responses::{ErrorBody, Response, SubmitSummary};
pub use service::ScoringServer;
pub use transport::{LineTransport, TransportConfig};
pub use types::AppState;
