//! Request types for the line protocol.
//!
//! One JSON object per line, discriminated by its `op` field.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A decoded protocol request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Create an empty learner profile.
    Enroll {
        /// Learner to enroll.
        learner_id: String,
    },
    /// Record an assessment submission.
    Submit {
        /// Submitting learner.
        learner_id: String,
        /// Assessment type, e.g. `Mid` or `Fin`.
        #[serde(default)]
        assessment_type: Option<String>,
        /// Answers as JSON text.
        #[serde(default)]
        answers: Option<String>,
        /// Score as decimal text or a JSON number.
        #[serde(default)]
        score: Option<ScoreField>,
    },
    /// Read a learner profile.
    GetLearner {
        /// Learner to read.
        learner_id: String,
    },
}

impl Request {
    /// Protocol name of the operation, for logs.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Enroll { .. } => "enroll",
            Self::Submit { .. } => "submit",
            Self::GetLearner { .. } => "get_learner",
        }
    }

    /// Learner the request targets.
    #[must_use]
    pub fn learner_id(&self) -> &str {
        match self {
            Self::Enroll { learner_id }
            | Self::Submit { learner_id, .. }
            | Self::GetLearner { learner_id } => learner_id,
        }
    }
}

/// Score as sent by a client.
///
/// Form posts send text; scripted clients tend to send numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreField {
    /// Decimal text, parsed during validation.
    Text(String),
    /// Already numeric.
    Number(f64),
}

impl ScoreField {
    /// The score as text, ready for [`crate::scoring::Submission::from_request`].
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(number) => Cow::Owned(number.to_string()),
        }
    }
}
