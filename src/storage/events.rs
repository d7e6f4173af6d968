//! Submission event (audit trail) storage operations.

#![allow(clippy::missing_errors_doc)]

use sqlx::Row;

use crate::error::StorageError;

use super::core::SqliteStorage;
use super::types::SubmissionEvent;

impl SqliteStorage {
    /// Append an event. Events are never updated or deleted.
    pub async fn record_event(&self, event: &SubmissionEvent) -> Result<(), StorageError> {
        let payload = Self::encode_json("events.payload", &event.payload)?;

        sqlx::query(
            "INSERT INTO events (id, event_type, learner_id, payload, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.event_type)
        .bind(&event.learner_id)
        .bind(&payload)
        .bind(event.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::classify_error("INSERT events", &e))?;

        Ok(())
    }

    /// Get all events for a learner, oldest first.
    pub async fn get_events(&self, learner_id: &str) -> Result<Vec<SubmissionEvent>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, event_type, learner_id, payload, created_at
             FROM events WHERE learner_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(learner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::classify_error("SELECT events", &e))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(Self::row_to_event(row)?);
        }

        Ok(events)
    }

    /// Convert a database row to a `SubmissionEvent`.
    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<SubmissionEvent, StorageError> {
        let payload: String = row.get("payload");
        let created_at: String = row.get("created_at");

        Ok(SubmissionEvent {
            id: row.get("id"),
            event_type: row.get("event_type"),
            learner_id: row.get("learner_id"),
            payload: Self::decode_json("events.payload", &payload)?,
            created_at: Self::parse_datetime(&created_at)?,
        })
    }
}
