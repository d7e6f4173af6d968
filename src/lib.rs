//! Assessment Scoring
//!
//! The transactional scoring core of a learning platform: records learner
//! assessment submissions, keeps the best score per assessment type and
//! derives a weighted overall score and pass/fail verdict from the final
//! assessment.
//!
//! # Features
//!
//! - Monotone best-score rule per assessment type
//! - Overall score `floor(0.3 * Mid + 0.7 * Fin)`, pass at 70
//! - One atomic `SQLite` transaction per submission, serialized per learner
//! - Bounded retry with exponential backoff on lock conflicts
//! - Post-commit hooks for audit events and progress tracking
//!
//! # Quick Start
//!
//! ```bash
//! DATABASE_PATH=./data/assessments.db ./assessment-scoring
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  JSON lines   ┌─────────────────────┐
//! │   Client    │──────────────▶│ AssessmentRecorder  │──────▶ Post-commit hooks
//! │             │◀──────────────│  (retry + rules)    │
//! └─────────────┘    stdout     └──────────┬──────────┘
//!                                          │ one transaction
//!                                          ▼
//!                                       SQLite
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod scoring;
pub mod server;
pub mod storage;
pub mod traits;
