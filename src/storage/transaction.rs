//! Per-learner unit of work.
//!
//! A [`ScoringTransaction`] wraps one `SQLite` transaction over a learner's
//! profile row and answers row. Its first statement is a write against the
//! learner row, so the database write lock is taken before anything is read:
//! two submissions for the same learner serialize, and the second observes
//! the first's committed state. Dropping the transaction without calling
//! [`ScoringTransaction::commit`] rolls everything back.

#![allow(clippy::missing_errors_doc)]

use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};

use crate::error::StorageError;

use super::core::SqliteStorage;
use super::types::{AnswersRecord, LearnerProfile};

/// Open transaction scoped to a single learner.
pub struct ScoringTransaction {
    tx: Transaction<'static, Sqlite>,
    learner_id: String,
}

impl fmt::Debug for ScoringTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringTransaction")
            .field("learner_id", &self.learner_id)
            .finish_non_exhaustive()
    }
}

impl SqliteStorage {
    /// Begin a transaction for `learner_id` and take the write lock.
    ///
    /// Returns [`StorageError::LearnerNotFound`] (with nothing written) if
    /// the learner is not enrolled, and [`StorageError::Conflict`] if the
    /// lock could not be obtained within the busy timeout.
    pub async fn begin_for_learner(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScoringTransaction, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::classify_error("BEGIN", &e))?;

        let result = sqlx::query("UPDATE learners SET updated_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(learner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::classify_error("UPDATE learners (lock)", &e))?;

        if result.rows_affected() == 0 {
            // `tx` is dropped here and rolled back.
            return Err(StorageError::LearnerNotFound {
                learner_id: learner_id.to_string(),
            });
        }

        Ok(ScoringTransaction {
            tx,
            learner_id: learner_id.to_string(),
        })
    }
}

impl ScoringTransaction {
    /// Load the learner profile.
    pub async fn load_profile(&mut self) -> Result<LearnerProfile, StorageError> {
        let row = sqlx::query(
            "SELECT id, scores, created_at, updated_at FROM learners WHERE id = ?",
        )
        .bind(&self.learner_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| SqliteStorage::classify_error("SELECT learners", &e))?;

        match row {
            Some(row) => SqliteStorage::row_to_profile(&row),
            None => Err(StorageError::LearnerNotFound {
                learner_id: self.learner_id.clone(),
            }),
        }
    }

    /// Load the answers record, creating an empty one in memory if absent.
    pub async fn load_or_create_answers(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<AnswersRecord, StorageError> {
        let row =
            sqlx::query("SELECT learner_id, data, updated_on FROM answers WHERE learner_id = ?")
                .bind(&self.learner_id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(|e| SqliteStorage::classify_error("SELECT answers", &e))?;

        match row {
            Some(row) => SqliteStorage::row_to_answers(&row),
            None => Ok(AnswersRecord::new(self.learner_id.clone(), now)),
        }
    }

    /// Write the profile's scores and timestamp.
    pub async fn save_profile(&mut self, profile: &LearnerProfile) -> Result<(), StorageError> {
        self.check_owner(&profile.id)?;
        let scores = SqliteStorage::encode_json("learners.scores", &profile.scores)?;

        sqlx::query("UPDATE learners SET scores = ?, updated_at = ? WHERE id = ?")
            .bind(&scores)
            .bind(profile.updated_at.to_rfc3339())
            .bind(&profile.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| SqliteStorage::classify_error("UPDATE learners", &e))?;

        Ok(())
    }

    /// Upsert the answers record.
    pub async fn save_answers(&mut self, record: &AnswersRecord) -> Result<(), StorageError> {
        self.check_owner(&record.learner_id)?;
        let data = SqliteStorage::encode_json("answers.data", &record.answers)?;

        sqlx::query(
            "INSERT INTO answers (learner_id, data, updated_on) VALUES (?, ?, ?)
             ON CONFLICT(learner_id)
             DO UPDATE SET data = excluded.data, updated_on = excluded.updated_on",
        )
        .bind(&record.learner_id)
        .bind(&data)
        .bind(record.updated_on.to_rfc3339())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| SqliteStorage::classify_error("UPSERT answers", &e))?;

        Ok(())
    }

    /// Commit both records.
    pub async fn commit(self) -> Result<(), StorageError> {
        self.tx
            .commit()
            .await
            .map_err(|e| SqliteStorage::classify_error("COMMIT", &e))
    }

    /// Explicitly roll back. Dropping the transaction has the same effect.
    pub async fn rollback(self) -> Result<(), StorageError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| SqliteStorage::classify_error("ROLLBACK", &e))
    }

    fn check_owner(&self, id: &str) -> Result<(), StorageError> {
        if id == self.learner_id {
            Ok(())
        } else {
            Err(StorageError::Internal {
                message: format!(
                    "record for {id} written through transaction for {}",
                    self.learner_id
                ),
            })
        }
    }
}
