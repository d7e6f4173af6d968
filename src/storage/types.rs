//! Storage types for database operations.
//!
//! This module defines the records persisted in the database:
//! - [`LearnerProfile`]: Learner identity and per-assessment scores
//! - [`AnswersRecord`]: Latest answer payload per assessment type
//! - [`SubmissionEvent`]: Append-only audit record

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type recorded for every committed submission.
pub const SUBMIT_ASSESSMENT_EVENT: &str = "submit-assessment";

/// Learner profile stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Unique learner identifier.
    pub id: String,
    /// Assessment type name to integer score.
    pub scores: BTreeMap<String, i64>,
    /// Enrollment timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LearnerProfile {
    /// Create a new profile with no scores.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self::with_timestamps(id, now, now)
    }

    /// Create a profile with specific timestamps.
    #[must_use]
    pub fn with_timestamps(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            scores: BTreeMap::new(),
            created_at,
            updated_at,
        }
    }

    /// Replace the score map.
    #[must_use]
    pub fn with_scores(mut self, scores: BTreeMap<String, i64>) -> Self {
        self.scores = scores;
        self
    }
}

/// Latest answers per assessment type for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersRecord {
    /// Owning learner identifier.
    pub learner_id: String,
    /// Assessment type name to the most recent raw answer payload.
    pub answers: BTreeMap<String, Value>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

impl AnswersRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new(learner_id: impl Into<String>, updated_on: DateTime<Utc>) -> Self {
        Self {
            learner_id: learner_id.into(),
            answers: BTreeMap::new(),
            updated_on,
        }
    }

    /// Overwrite the stored answers for `assessment_type` and bump the timestamp.
    pub fn set_answer(&mut self, assessment_type: &str, answers: Value, now: DateTime<Utc>) {
        self.answers.insert(assessment_type.to_string(), answers);
        self.updated_on = now;
    }

    /// Stored answers for `assessment_type`.
    #[must_use]
    pub fn answer(&self, assessment_type: &str) -> Option<&Value> {
        self.answers.get(assessment_type)
    }
}

/// Append-only audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEvent {
    /// Unique event identifier.
    pub id: String,
    /// Event type, e.g. `submit-assessment`.
    pub event_type: String,
    /// Learner the event belongs to.
    pub learner_id: String,
    /// JSON payload.
    pub payload: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl SubmissionEvent {
    /// Build a `submit-assessment` event.
    ///
    /// The payload carries `{type: "assessment-<type>", values, location}`.
    #[must_use]
    pub fn submit_assessment(
        learner_id: impl Into<String>,
        assessment_type: &str,
        values: Value,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: SUBMIT_ASSESSMENT_EVENT.to_string(),
            learner_id: learner_id.into(),
            payload: serde_json::json!({
                "type": format!("assessment-{assessment_type}"),
                "values": values,
                "location": location,
            }),
            created_at,
        }
    }
}
