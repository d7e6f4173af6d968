//! Core `SQLite` storage implementation.
//!
//! This module provides the main [`SqliteStorage`] struct, migrations and
//! the helpers shared by the record modules.

#![allow(clippy::missing_errors_doc)]

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::Config;
use crate::error::StorageError;

use super::types::{AnswersRecord, LearnerProfile};

/// Busy timeout used by [`SqliteStorage::new`].
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool size used by [`SqliteStorage::new`].
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Primary result codes `SQLITE_BUSY` and `SQLITE_LOCKED`.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// `SQLite` storage backend.
///
/// Provides persistent storage for learner profiles, answers records and
/// submission events.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pub(crate) pool: SqlitePool,
}

impl SqliteStorage {
    /// Get a clone of the connection pool.
    #[must_use]
    pub fn get_pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create a new `SQLite` storage instance with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the connection fails.
    pub async fn new(database_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::connect(
            database_path.as_ref(),
            DEFAULT_BUSY_TIMEOUT,
            DEFAULT_MAX_CONNECTIONS,
        )
        .await
    }

    /// Create a storage instance from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the connection fails.
    pub async fn from_config(config: &Config) -> Result<Self, StorageError> {
        Self::connect(
            Path::new(&config.database_path),
            config.busy_timeout(),
            config.max_connections,
        )
        .await
    }

    async fn connect(
        path: &Path,
        busy_timeout: Duration,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to create database directory: {e}"),
            })?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", path.display()))
                .map_err(|e| StorageError::ConnectionFailed {
                    message: format!("Invalid database path: {e}"),
                })?
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(busy_timeout)
                .foreign_keys(true)
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to connect to database: {e}"),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        tracing::debug!(path = %path.display(), max_connections, "storage ready");
        Ok(storage)
    }

    /// Create a new in-memory `SQLite` storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the connection fails.
    pub async fn new_in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Invalid memory database options: {e}"),
            })?
            .foreign_keys(true);

        // A second connection would open a separate, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to create in-memory database: {e}"),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations.
    ///
    /// Each migration is idempotent (uses IF NOT EXISTS).
    pub(crate) async fn run_migrations(&self) -> Result<(), StorageError> {
        let schema_001 = include_str!("../../migrations/001_initial_schema.sql");
        sqlx::query(schema_001)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed {
                version: "001".to_string(),
                message: format!("Failed to run migration 001: {e}"),
            })?;

        Ok(())
    }

    /// Parse a datetime string from the database.
    pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| StorageError::Internal {
                message: format!("Failed to parse datetime '{s}': {e}"),
            })
    }

    /// Create a query error with the given query name and message.
    pub(crate) fn query_error(query: &str, message: String) -> StorageError {
        StorageError::QueryFailed {
            query: query.to_string(),
            message,
        }
    }

    /// Map a driver error, separating lock contention from hard failures.
    ///
    /// Busy and locked results (including extended codes such as
    /// `SQLITE_BUSY_SNAPSHOT`) become [`StorageError::Conflict`].
    pub(crate) fn classify_error(query: &str, err: &sqlx::Error) -> StorageError {
        let contended = match err {
            sqlx::Error::Database(db) => db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
            sqlx::Error::PoolTimedOut => true,
            _ => false,
        };

        if contended {
            StorageError::Conflict {
                query: query.to_string(),
                message: format!("{err}"),
            }
        } else {
            Self::query_error(query, format!("{err}"))
        }
    }

    /// Encode a value for a JSON text column.
    pub(crate) fn encode_json<T: Serialize>(
        column: &str,
        value: &T,
    ) -> Result<String, StorageError> {
        serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            column: column.to_string(),
            message: e.to_string(),
        })
    }

    /// Decode a JSON text column.
    pub(crate) fn decode_json<T: DeserializeOwned>(
        column: &str,
        raw: &str,
    ) -> Result<T, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization {
            column: column.to_string(),
            message: e.to_string(),
        })
    }

    /// Convert a `learners` row to a [`LearnerProfile`].
    pub(crate) fn row_to_profile(
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<LearnerProfile, StorageError> {
        let id: String = row.get("id");
        let scores_raw: String = row.get("scores");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        let scores: BTreeMap<String, i64> = Self::decode_json("learners.scores", &scores_raw)?;

        Ok(LearnerProfile::with_timestamps(
            id,
            Self::parse_datetime(&created_at_str)?,
            Self::parse_datetime(&updated_at_str)?,
        )
        .with_scores(scores))
    }

    /// Convert an `answers` row to an [`AnswersRecord`].
    pub(crate) fn row_to_answers(
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<AnswersRecord, StorageError> {
        let learner_id: String = row.get("learner_id");
        let data: String = row.get("data");
        let updated_on_str: String = row.get("updated_on");

        Ok(AnswersRecord {
            learner_id,
            answers: Self::decode_json("answers.data", &data)?,
            updated_on: Self::parse_datetime(&updated_on_str)?,
        })
    }
}
