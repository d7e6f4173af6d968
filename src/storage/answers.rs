//! Answers record read operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;

use super::core::SqliteStorage;
use super::types::AnswersRecord;

impl SqliteStorage {
    /// Get the answers record for a learner.
    ///
    /// Returns `None` until the learner's first submission.
    pub async fn get_answers(
        &self,
        learner_id: &str,
    ) -> Result<Option<AnswersRecord>, StorageError> {
        let row =
            sqlx::query("SELECT learner_id, data, updated_on FROM answers WHERE learner_id = ?")
                .bind(learner_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Self::classify_error("SELECT answers", &e))?;

        row.as_ref().map(Self::row_to_answers).transpose()
    }
}
