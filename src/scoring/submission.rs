//! Validated submission input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScoringError;

use super::rules::{round_score, OVERALL_SCORE_KEY};

/// One learner submission, validated before any storage access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Submitting learner.
    pub learner_id: String,
    /// Assessment type, e.g. `Mid` or `Fin`.
    pub assessment_type: String,
    /// Opaque answer payload.
    pub answers: Value,
    /// Pre-computed score as received.
    pub raw_score: f64,
}

impl Submission {
    /// Build a submission from already-decoded values.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Validation`] if the learner id or assessment
    /// type is empty, the assessment type is the reserved overall-score key,
    /// or the score is not finite.
    pub fn new(
        learner_id: impl Into<String>,
        assessment_type: impl Into<String>,
        answers: Value,
        raw_score: f64,
    ) -> Result<Self, ScoringError> {
        let learner_id = learner_id.into();
        let assessment_type = assessment_type.into();

        if learner_id.trim().is_empty() {
            return Err(ScoringError::validation("learner_id", "must not be empty"));
        }
        if assessment_type.trim().is_empty() {
            return Err(ScoringError::validation(
                "assessment_type",
                "must not be empty",
            ));
        }
        if assessment_type == OVERALL_SCORE_KEY {
            return Err(ScoringError::validation(
                "assessment_type",
                format!("`{OVERALL_SCORE_KEY}` is derived and cannot be submitted"),
            ));
        }
        if !raw_score.is_finite() {
            return Err(ScoringError::validation("score", "must be a finite number"));
        }

        Ok(Self {
            learner_id,
            assessment_type,
            answers,
            raw_score,
        })
    }

    /// Build a submission from request form fields.
    ///
    /// `answers` is JSON text; missing or blank answers become an empty list.
    /// `score` is a decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Validation`] for a missing assessment type,
    /// undecodable answers, or a missing or malformed score.
    pub fn from_request(
        learner_id: &str,
        assessment_type: Option<&str>,
        answers: Option<&str>,
        score: Option<&str>,
    ) -> Result<Self, ScoringError> {
        let assessment_type = assessment_type.filter(|t| !t.is_empty()).ok_or_else(|| {
            ScoringError::validation("assessment_type", "no assessment type supplied")
        })?;

        let answers = match answers.map(str::trim) {
            None | Some("") => Value::Array(Vec::new()),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| ScoringError::validation("answers", format!("invalid JSON: {e}")))?,
        };

        let score = score
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScoringError::validation("score", "no score supplied"))?;
        let raw_score: f64 = score
            .parse()
            .map_err(|_| ScoringError::validation("score", format!("`{score}` is not a number")))?;

        Self::new(learner_id, assessment_type, answers, raw_score)
    }

    /// The score as stored: rounded to an integer.
    #[must_use]
    pub fn score(&self) -> i64 {
        round_score(self.raw_score)
    }
}
