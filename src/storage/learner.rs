//! Learner profile storage operations.

#![allow(clippy::missing_errors_doc)]

use chrono::Utc;

use crate::error::StorageError;

use super::core::SqliteStorage;
use super::types::LearnerProfile;

impl SqliteStorage {
    /// Enroll a learner with an empty score map.
    ///
    /// Returns [`StorageError::InvalidLearnerId`] for a blank id and
    /// [`StorageError::LearnerExists`] if the id is taken.
    pub async fn enroll_learner(&self, id: &str) -> Result<LearnerProfile, StorageError> {
        if id.trim().is_empty() {
            return Err(StorageError::InvalidLearnerId {
                learner_id: id.to_string(),
            });
        }

        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO learners (id, scores, created_at, updated_at) VALUES (?, '{}', ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::classify_error("INSERT learners", &e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::LearnerExists {
                learner_id: id.to_string(),
            });
        }

        tracing::info!(learner_id = id, "learner enrolled");
        Ok(LearnerProfile::with_timestamps(id, now, now))
    }

    /// Get a learner profile by ID.
    pub async fn get_learner(&self, id: &str) -> Result<Option<LearnerProfile>, StorageError> {
        let row = sqlx::query(
            "SELECT id, scores, created_at, updated_at FROM learners WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::classify_error("SELECT learners", &e))?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    /// Read a single stored score.
    ///
    /// Returns [`StorageError::LearnerNotFound`] for an unknown learner and
    /// `None` when the learner has no score for `assessment_type`.
    pub async fn get_score(
        &self,
        learner_id: &str,
        assessment_type: &str,
    ) -> Result<Option<i64>, StorageError> {
        let profile =
            self.get_learner(learner_id)
                .await?
                .ok_or_else(|| StorageError::LearnerNotFound {
                    learner_id: learner_id.to_string(),
                })?;

        Ok(profile.scores.get(assessment_type).copied())
    }
}
