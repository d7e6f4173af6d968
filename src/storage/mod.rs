//! Storage backend.
//!
//! This module provides:
//! - `SQLite` database implementation
//! - Learner enrollment and profile reads
//! - Answers record reads
//! - Append-only submission events
//! - A per-learner unit of work ([`ScoringTransaction`])
//!
//! # Architecture
//!
//! The storage layer uses `SQLite` with the `sqlx` crate for async operations.
//! Score and answer writes only happen inside a [`ScoringTransaction`];
//! everything else on [`SqliteStorage`] is either a read or an append.
//!
//! - `core`: Pool management, migrations, and helper functions
//! - `learner`: Enrollment and profile reads
//! - `answers`: Answers record reads
//! - `events`: Submission event append and query
//! - `transaction`: The unit of work used by the recorder
//!
//! # Example
//!
//! ```ignore
//! use assessment_scoring::storage::SqliteStorage;
//!
//! let storage = SqliteStorage::new("./data/assessments.db").await?;
//! storage.enroll_learner("learner-1").await?;
//! ```

mod answers;
mod core;
mod events;
mod learner;
mod transaction;
mod types;

pub use self::core::SqliteStorage;
pub use transaction::ScoringTransaction;
pub use types::{AnswersRecord, LearnerProfile, SubmissionEvent, SUBMIT_ASSESSMENT_EVENT};
