//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with `.env` support)
//! - Configuration validation
//! - Default value handling
//!
//! # Example
//!
//! ```
//! use assessment_scoring::config::{Config, DEFAULT_DATABASE_PATH};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     database_path: DEFAULT_DATABASE_PATH.to_string(),
//!     log_level: "info".to_string(),
//!     log_json: false,
//!     max_retries: 3,
//!     retry_base_delay_ms: 25,
//!     busy_timeout_ms: 5_000,
//!     max_connections: 5,
//! };
//!
//! assert_eq!(config.retry_policy().max_attempts(), 4);
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_BUSY_TIMEOUT_MS, MAX_CONNECTIONS, MAX_RETRIES, MAX_RETRY_BASE_DELAY_MS,
    MIN_BUSY_TIMEOUT_MS,
};

use std::time::Duration;

use crate::error::ConfigError;
use crate::scoring::RetryPolicy;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/assessments.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default number of retries after a transaction conflict.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between conflict retries, doubled on every attempt.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 25;

/// Default time a connection waits on a held write lock before reporting busy.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace) or a full `EnvFilter` directive.
    pub log_level: String,
    /// Emit logs as JSON lines instead of plain text.
    pub log_json: bool,
    /// Retries after a transaction conflict (attempts = retries + 1).
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    pub retry_base_delay_ms: u64,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            log_json: false,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to `SQLite` database (default: `./data/assessments.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `LOG_FORMAT`: `text` or `json` (default: `text`)
    /// - `MAX_RETRIES`: Conflict retries (default: `3`)
    /// - `RETRY_BASE_DELAY_MS`: Base backoff delay (default: `25`)
    /// - `BUSY_TIMEOUT_MS`: `SQLite` busy timeout (default: `5000`)
    /// - `MAX_CONNECTIONS`: Pool size (default: `5`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse, if
    /// `LOG_FORMAT` is unknown, or if any value fails validation
    /// (see [`validate_config`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let log_json = match std::env::var("LOG_FORMAT").as_deref() {
            Err(_) | Ok("text") => false,
            Ok("json") => true,
            Ok(_) => {
                return Err(ConfigError::InvalidValue {
                    var: "LOG_FORMAT".into(),
                    reason: "must be `text` or `json`".into(),
                })
            }
        };

        let config = Self {
            database_path,
            log_level,
            log_json,
            max_retries: parse_env_u32("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_delay_ms: parse_env_u64("RETRY_BASE_DELAY_MS", DEFAULT_RETRY_BASE_DELAY_MS)?,
            busy_timeout_ms: parse_env_u64("BUSY_TIMEOUT_MS", DEFAULT_BUSY_TIMEOUT_MS)?,
            max_connections: parse_env_u32("MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Retry policy for the transaction execution layer.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    /// `SQLite` busy timeout.
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
