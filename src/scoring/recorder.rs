//! The submission transaction.
//!
//! [`AssessmentRecorder::record_submission`] runs the whole update as one
//! [`crate::storage::ScoringTransaction`]: it writes the answers, applies the best-score
//! rule, derives the final grade when needed, and commits both records
//! together. Conflicts are retried by the [`RetryPolicy`]. Post-commit hooks
//! run only once the commit has succeeded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ScoringError, StorageError};
use crate::storage::{LearnerProfile, SqliteStorage};
use crate::traits::{RealTimeProvider, TimeProvider};

use super::hooks::PostCommitHook;
use super::retry::RetryPolicy;
use super::rules::{AssessmentResult, OVERALL_SCORE_KEY};
use super::score_store::{apply_score, ScoreUpdate};
use super::submission::Submission;

/// What a committed submission produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Assessment type that was submitted.
    pub assessment_type: String,
    /// Learner profile as committed.
    pub profile: LearnerProfile,
    /// Best-score update for the submitted type.
    pub update: ScoreUpdate,
    /// Pass/fail verdict, present only for the final assessment.
    pub result: Option<AssessmentResult>,
    /// Commit timestamp.
    pub committed_at: DateTime<Utc>,
    /// Attempts needed, including retries after conflicts.
    pub attempts: u32,
}

impl SubmissionOutcome {
    /// The learner's stored overall score, if a final grade was ever derived.
    #[must_use]
    pub fn overall_score(&self) -> Option<i64> {
        self.profile.scores.get(OVERALL_SCORE_KEY).copied()
    }
}

/// Orchestrates the atomic submission update.
pub struct AssessmentRecorder {
    storage: SqliteStorage,
    retry: RetryPolicy,
    time: Arc<dyn TimeProvider>,
    hooks: Vec<Arc<dyn PostCommitHook>>,
}

impl std::fmt::Debug for AssessmentRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentRecorder")
            .field("retry", &self.retry)
            .field(
                "hooks",
                &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl AssessmentRecorder {
    /// Create a recorder with the default retry policy and no hooks.
    #[must_use]
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            storage,
            retry: RetryPolicy::default(),
            time: Arc::new(RealTimeProvider),
            hooks: Vec::new(),
        }
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the time source.
    #[must_use]
    pub fn with_time_provider(mut self, time: Arc<dyn TimeProvider>) -> Self {
        self.time = time;
        self
    }

    /// Append a post-commit hook. Hooks run in registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Validate and record a submission from decoded values.
    ///
    /// # Errors
    ///
    /// See [`AssessmentRecorder::record_submission`]; additionally returns
    /// [`ScoringError::Validation`] for invalid input.
    pub async fn record(
        &self,
        learner_id: &str,
        assessment_type: &str,
        answers: Value,
        raw_score: f64,
    ) -> Result<SubmissionOutcome, ScoringError> {
        let submission = Submission::new(learner_id, assessment_type, answers, raw_score)?;
        self.record_submission(&submission).await
    }

    /// Record a submission atomically, then run post-commit hooks.
    ///
    /// # Errors
    ///
    /// - [`ScoringError::NotFound`] if the learner is not enrolled
    /// - [`ScoringError::Conflict`] if contention outlasted the retry budget
    /// - [`ScoringError::Storage`] for any other persistence failure
    ///
    /// In every error case both records are left as they were.
    pub async fn record_submission(
        &self,
        submission: &Submission,
    ) -> Result<SubmissionOutcome, ScoringError> {
        let outcome = self
            .retry
            .execute(&submission.learner_id, move |attempt| {
                self.try_record(submission, attempt)
            })
            .await?;

        tracing::info!(
            learner_id = %submission.learner_id,
            assessment_type = %submission.assessment_type,
            score = outcome.update.score,
            changed = outcome.update.changed,
            result = outcome.result.as_ref().map(AssessmentResult::as_str),
            attempts = outcome.attempts,
            "submission committed"
        );

        self.run_hooks(submission, &outcome).await;
        Ok(outcome)
    }

    async fn try_record(
        &self,
        submission: &Submission,
        attempt: u32,
    ) -> Result<SubmissionOutcome, StorageError> {
        let now = self.time.now();
        let mut tx = self
            .storage
            .begin_for_learner(&submission.learner_id, now)
            .await?;

        let mut profile = tx.load_profile().await?;
        let mut answers = tx.load_or_create_answers(now).await?;
        answers.set_answer(&submission.assessment_type, submission.answers.clone(), now);

        let (update, grade) =
            apply_score(&mut profile, &submission.assessment_type, submission.score());
        profile.updated_at = now;

        tx.save_profile(&profile).await?;
        tx.save_answers(&answers).await?;
        tx.commit().await?;

        Ok(SubmissionOutcome {
            assessment_type: submission.assessment_type.clone(),
            profile,
            update,
            result: grade.map(|g| g.result),
            committed_at: now,
            attempts: attempt,
        })
    }

    async fn run_hooks(&self, submission: &Submission, outcome: &SubmissionOutcome) {
        for hook in &self.hooks {
            if let Err(err) = hook.on_commit(submission, outcome).await {
                tracing::warn!(
                    hook = hook.name(),
                    learner_id = %submission.learner_id,
                    error = %err,
                    "post-commit hook failed"
                );
            }
        }
    }
}
