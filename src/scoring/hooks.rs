//! Post-commit hooks.
//!
//! Hooks run after a submission's transaction has committed and never on
//! rollback. They are best-effort: the recorder logs a failing hook and
//! carries on. A retried submission can therefore be observed more than
//! once by a hook only if the caller resubmits; a lost hook call never
//! loses a score.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HookError;
use crate::storage::{SqliteStorage, SubmissionEvent};
use crate::traits::{ProgressTracker, TimeProvider};

use super::recorder::SubmissionOutcome;
use super::submission::Submission;

/// Origin tag stored in the audit payload's `location` field.
pub const AUDIT_LOCATION: &str = "AssessmentRecorder";

/// Side effect run after a successful commit.
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// React to a committed submission.
    ///
    /// # Errors
    ///
    /// Returns [`HookError`]; the recorder logs it and does not propagate it.
    async fn on_commit(
        &self,
        submission: &Submission,
        outcome: &SubmissionOutcome,
    ) -> Result<(), HookError>;
}

/// Appends a `submit-assessment` [`SubmissionEvent`].
#[derive(Clone)]
pub struct AuditEventHook {
    storage: SqliteStorage,
    time: Arc<dyn TimeProvider>,
    location: String,
}

impl AuditEventHook {
    /// Create a hook writing to `storage`.
    #[must_use]
    pub fn new(storage: SqliteStorage, time: Arc<dyn TimeProvider>) -> Self {
        Self {
            storage,
            time,
            location: AUDIT_LOCATION.to_string(),
        }
    }

    /// Override the origin tag.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

#[async_trait]
impl PostCommitHook for AuditEventHook {
    fn name(&self) -> &'static str {
        "audit-event"
    }

    async fn on_commit(
        &self,
        submission: &Submission,
        _outcome: &SubmissionOutcome,
    ) -> Result<(), HookError> {
        let event = SubmissionEvent::submit_assessment(
            submission.learner_id.clone(),
            &submission.assessment_type,
            submission.answers.clone(),
            &self.location,
            self.time.now(),
        );

        self.storage
            .record_event(&event)
            .await
            .map_err(|e| HookError::new(self.name(), e.to_string()))
    }
}

/// Notifies a [`ProgressTracker`] that the assessment was completed.
#[derive(Debug)]
pub struct ProgressHook<P> {
    tracker: P,
}

impl<P: ProgressTracker> ProgressHook<P> {
    /// Wrap a tracker.
    #[must_use]
    pub const fn new(tracker: P) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl<P: ProgressTracker> PostCommitHook for ProgressHook<P> {
    fn name(&self) -> &'static str {
        "progress"
    }

    async fn on_commit(
        &self,
        submission: &Submission,
        _outcome: &SubmissionOutcome,
    ) -> Result<(), HookError> {
        self.tracker
            .put_assessment_completed(&submission.learner_id, &submission.assessment_type)
            .await
    }
}

/// Progress tracker that only logs completions.
///
/// Used by the binary, where course progress lives in another service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProgressTracker;

#[async_trait]
impl ProgressTracker for LoggingProgressTracker {
    async fn put_assessment_completed(
        &self,
        learner_id: &str,
        assessment_type: &str,
    ) -> Result<(), HookError> {
        tracing::info!(learner_id, assessment_type, "assessment completed");
        Ok(())
    }
}
