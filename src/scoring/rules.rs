//! Pure scoring rules.
//!
//! Everything here is a function of its arguments: rounding at the input
//! boundary, the monotone best-of rule and the final-grade formula.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Assessment type that triggers the overall-score derivation.
pub const FINAL_ASSESSMENT: &str = "Fin";

/// Assessment type read as the mid-course score.
pub const MIDCOURSE_ASSESSMENT: &str = "Mid";

/// Synthetic score key holding the derived overall score.
pub const OVERALL_SCORE_KEY: &str = "overall_score";

/// Overall scores at or above this value pass.
pub const PASS_THRESHOLD: i64 = 70;

/// Weight of the mid-course score, in percent.
pub const MIDCOURSE_WEIGHT_PERCENT: i64 = 30;

/// Weight of the final score, in percent.
pub const FINAL_WEIGHT_PERCENT: i64 = 70;

/// Round a raw score to the stored integer (half away from zero).
///
/// Pass/fail thresholds apply to the rounded value.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_score(raw: f64) -> i64 {
    // `as` saturates for out-of-range values; NaN is rejected upstream.
    raw.round() as i64
}

/// The monotone update rule: keep the higher of the prior and the candidate.
#[must_use]
pub const fn best_of(prior: Option<i64>, candidate: i64) -> i64 {
    match prior {
        Some(existing) if existing >= candidate => existing,
        _ => candidate,
    }
}

/// `floor(0.3 * mid + 0.7 * post_course)`, computed exactly.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn overall_score(midcourse: i64, post_course: i64) -> i64 {
    let weighted = i128::from(MIDCOURSE_WEIGHT_PERCENT) * i128::from(midcourse)
        + i128::from(FINAL_WEIGHT_PERCENT) * i128::from(post_course);
    // A weighted mean of two i64 values always fits back into i64.
    weighted.div_euclid(100) as i64
}

/// Pass/fail verdict for the final assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentResult {
    /// Overall score reached [`PASS_THRESHOLD`].
    Pass,
    /// Overall score below [`PASS_THRESHOLD`].
    Fail,
}

impl AssessmentResult {
    /// Verdict for an overall score.
    #[must_use]
    pub const fn from_overall(overall: i64) -> Self {
        if overall >= PASS_THRESHOLD {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for AssessmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived overall score and verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalGrade {
    /// Stored under [`OVERALL_SCORE_KEY`].
    pub overall: i64,
    /// Pass/fail verdict.
    pub result: AssessmentResult,
}

impl FinalGrade {
    /// Grade a learner from their mid-course and (updated) final scores.
    #[must_use]
    pub fn compute(midcourse: i64, post_course: i64) -> Self {
        let overall = overall_score(midcourse, post_course);
        Self {
            overall,
            result: AssessmentResult::from_overall(overall),
        }
    }
}
