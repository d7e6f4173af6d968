//! Assessment scoring.
//!
//! This module provides:
//! - Pure scoring rules (rounding, best-of, final grade)
//! - The [`ScoreStore`] abstraction with the monotone update rule
//! - Submission validation
//! - The transactional [`AssessmentRecorder`] with conflict retry
//! - Post-commit hooks for auditing and progress tracking
//!
//! # Example
//!
//! ```ignore
//! use assessment_scoring::scoring::AssessmentRecorder;
//! use serde_json::json;
//!
//! let recorder = AssessmentRecorder::new(storage);
//! let outcome = recorder.record("learner-1", "Fin", json!(["b"]), 88.0).await?;
//! println!("overall: {:?}", outcome.overall_score());
//! ```

mod hooks;
mod recorder;
mod retry;
mod rules;
mod score_store;
mod submission;

pub use hooks::{
    AuditEventHook, LoggingProgressTracker, PostCommitHook, ProgressHook, AUDIT_LOCATION,
};
pub use recorder::{AssessmentRecorder, SubmissionOutcome};
pub use retry::RetryPolicy;
pub use rules::{
    best_of, overall_score, round_score, AssessmentResult, FinalGrade, FINAL_ASSESSMENT,
    FINAL_WEIGHT_PERCENT, MIDCOURSE_ASSESSMENT, MIDCOURSE_WEIGHT_PERCENT, OVERALL_SCORE_KEY,
    PASS_THRESHOLD,
};
pub use score_store::{apply_score, ScoreStore, ScoreUpdate};
pub use submission::Submission;
