//! Response types for the line protocol.
//!
//! Every request yields exactly one response line: `{"ok":true,...}` on
//! success or `{"ok":false,"error":{...}}` on failure.

use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, StorageError};
use crate::scoring::{AssessmentResult, SubmissionOutcome};
use crate::storage::LearnerProfile;

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Learner profile, for `enroll` and `get_learner`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner: Option<LearnerProfile>,
    /// Submission summary, for `submit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmitSummary>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Success carrying a learner profile.
    #[must_use]
    pub const fn learner(profile: LearnerProfile) -> Self {
        Self {
            ok: true,
            learner: Some(profile),
            submission: None,
            error: None,
        }
    }

    /// Success carrying a submission summary.
    #[must_use]
    pub const fn submitted(summary: SubmitSummary) -> Self {
        Self {
            ok: true,
            learner: None,
            submission: Some(summary),
            error: None,
        }
    }

    /// Failure.
    #[must_use]
    pub const fn error(error: ErrorBody) -> Self {
        Self {
            ok: false,
            learner: None,
            submission: None,
            error: Some(error),
        }
    }

    /// Serialize to a single line without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"error":{{"kind":"internal","message":"{e}"}}}}"#)
        })
    }
}

/// What a committed submission produced, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSummary {
    /// Assessment type submitted.
    pub assessment_type: String,
    /// Best stored score for that type.
    pub score: i64,
    /// Whether this submission raised the stored score.
    pub changed: bool,
    /// Stored overall score, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<i64>,
    /// Pass/fail, present only for the final assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    /// Attempts used.
    pub attempts: u32,
}

impl From<&SubmissionOutcome> for SubmitSummary {
    fn from(outcome: &SubmissionOutcome) -> Self {
        Self {
            assessment_type: outcome.assessment_type.clone(),
            score: outcome.update.score,
            changed: outcome.update.changed,
            overall_score: outcome.overall_score(),
            result: outcome.result,
            attempts: outcome.attempts,
        }
    }
}

/// Failure category and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable category.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorBody {
    /// Create an error body.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The line could not be decoded as a request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

impl From<&ScoringError> for ErrorBody {
    fn from(err: &ScoringError) -> Self {
        let kind = match err {
            ScoringError::NotFound { .. } => "not_found",
            ScoringError::Conflict { .. } => "conflict",
            ScoringError::Validation { .. } => "validation",
            ScoringError::Storage(_) => "storage",
        };
        Self::new(kind, err.to_string())
    }
}

impl From<&StorageError> for ErrorBody {
    fn from(err: &StorageError) -> Self {
        let kind = match err {
            StorageError::LearnerNotFound { .. } => "not_found",
            StorageError::LearnerExists { .. } => "exists",
            StorageError::InvalidLearnerId { .. } => "validation",
            StorageError::Conflict { .. } => "conflict",
            _ => "storage",
        };
        Self::new(kind, err.to_string())
    }
}
