//! Error types for the assessment scoring core.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`StorageError`]: Database operation errors
//! - [`ScoringError`]: Submission recording errors (not found, conflict, validation)
//! - [`HookError`]: Post-commit side-effect failures
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by the binary and the stdio server.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Scoring error.
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error on the request transport.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
    },
}

/// Storage errors.
///
/// These errors represent failures in database operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// Another transaction holds the write lock or invalidated our snapshot.
    #[error("Transaction conflict during {query}: {message}")]
    Conflict {
        /// The statement that hit the conflict.
        query: String,
        /// Database message.
        message: String,
    },

    /// Learner not found.
    #[error("Learner not found: {learner_id}")]
    LearnerNotFound {
        /// The learner ID that was not found.
        learner_id: String,
    },

    /// Learner id is empty or whitespace.
    #[error("Invalid learner id: {learner_id:?}")]
    InvalidLearnerId {
        /// The rejected id.
        learner_id: String,
    },

    /// Learner already enrolled.
    #[error("Learner already exists: {learner_id}")]
    LearnerExists {
        /// The duplicate learner ID.
        learner_id: String,
    },

    /// A stored JSON column could not be encoded or decoded.
    #[error("Serialization failed for {column}: {message}")]
    Serialization {
        /// Column being encoded or decoded.
        column: String,
        /// Description of the failure.
        message: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Returns true if retrying the whole transaction may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Submission recording errors.
///
/// Returned by [`crate::scoring::AssessmentRecorder`] and by request validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The learner is not enrolled. Nothing was written.
    #[error("Learner not found: {learner_id}")]
    NotFound {
        /// The unknown learner ID.
        learner_id: String,
    },

    /// Transaction contention outlasted the retry budget.
    #[error("Submission for {learner_id} conflicted after {attempts} attempts")]
    Conflict {
        /// The learner whose records were contended.
        learner_id: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Malformed input, rejected before any storage access.
    #[error("Invalid value for {field}: {reason}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Non-retryable persistence failure. The transaction was rolled back.
    #[error("Storage failure: {0}")]
    Storage(StorageError),
}

impl ScoringError {
    /// Shorthand for a validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for ScoringError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::LearnerNotFound { learner_id } => Self::NotFound { learner_id },
            other => Self::Storage(other),
        }
    }
}

/// Failure of a post-commit side effect.
///
/// Logged by the recorder; never rolls back a committed submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Post-commit hook {hook} failed: {message}")]
pub struct HookError {
    /// Hook name.
    pub hook: String,
    /// Description of the failure.
    pub message: String,
}

impl HookError {
    /// Create a hook error.
    pub fn new(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
