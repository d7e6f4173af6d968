//! Score mapping with the monotone update rule.

use serde::{Deserialize, Serialize};

use crate::storage::LearnerProfile;

use super::rules::{best_of, FinalGrade, FINAL_ASSESSMENT, MIDCOURSE_ASSESSMENT, OVERALL_SCORE_KEY};

/// Result of applying the update rule to one assessment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    /// Best score before this submission.
    pub prior: Option<i64>,
    /// Best score after this submission.
    pub score: i64,
    /// Whether the stored value changed.
    pub changed: bool,
}

/// Mapping from assessment type to integer score.
///
/// Implementors only provide raw reads and writes. The update rule lives in
/// the provided [`ScoreStore::set_score_if_higher`] so every store applies
/// it identically. Transaction boundaries are the caller's concern.
pub trait ScoreStore {
    /// Stored score for `assessment_type`.
    fn score(&self, assessment_type: &str) -> Option<i64>;

    /// Unconditionally store `score`.
    fn set_score(&mut self, assessment_type: &str, score: i64);

    /// Store `candidate` if there is no score yet or it beats the stored one.
    fn set_score_if_higher(&mut self, assessment_type: &str, candidate: i64) -> ScoreUpdate {
        let prior = self.score(assessment_type);
        let score = best_of(prior, candidate);
        let changed = prior != Some(score);
        if changed {
            self.set_score(assessment_type, score);
        }
        ScoreUpdate {
            prior,
            score,
            changed,
        }
    }
}

impl ScoreStore for LearnerProfile {
    fn score(&self, assessment_type: &str) -> Option<i64> {
        self.scores.get(assessment_type).copied()
    }

    fn set_score(&mut self, assessment_type: &str, score: i64) {
        self.scores.insert(assessment_type.to_string(), score);
    }
}

/// Apply one rounded submission score to `store`.
///
/// Updates the best score for `assessment_type`. For the final assessment
/// it also grades the learner from the stored mid-course score (absent
/// counts as 0) and the updated final score, and overwrites the overall
/// score. Submitting the mid-course assessment afterwards does not
/// recompute the overall score; it only changes on the next final submission.
pub fn apply_score<S: ScoreStore + ?Sized>(
    store: &mut S,
    assessment_type: &str,
    score: i64,
) -> (ScoreUpdate, Option<FinalGrade>) {
    let update = store.set_score_if_higher(assessment_type, score);

    if assessment_type != FINAL_ASSESSMENT {
        return (update, None);
    }

    let midcourse = store.score(MIDCOURSE_ASSESSMENT).unwrap_or(0);
    let grade = FinalGrade::compute(midcourse, update.score);
    store.set_score(OVERALL_SCORE_KEY, grade.overall);

    tracing::debug!(
        midcourse,
        post_course = update.score,
        overall = grade.overall,
        result = %grade.result,
        "final grade derived"
    );

    (update, Some(grade))
}
