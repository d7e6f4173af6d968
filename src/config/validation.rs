//! Configuration validation.
//!
//! Ensures configuration values are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Maximum allowed base retry delay in milliseconds.
pub const MAX_RETRY_BASE_DELAY_MS: u64 = 5_000;

/// Minimum allowed busy timeout in milliseconds.
pub const MIN_BUSY_TIMEOUT_MS: u64 = 100;

/// Maximum allowed busy timeout in milliseconds (1 minute).
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

/// Maximum allowed pool size.
pub const MAX_CONNECTIONS: u32 = 64;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] if `DATABASE_PATH` is blank and
/// [`ConfigError::InvalidValue`] if any value is out of range:
/// - `MAX_RETRIES` must be between 0 and 10
/// - `RETRY_BASE_DELAY_MS` must be between 1 and 5000
/// - `BUSY_TIMEOUT_MS` must be between 100 and 60000
/// - `MAX_CONNECTIONS` must be between 1 and 64
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            var: "DATABASE_PATH".into(),
        });
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::InvalidValue {
            var: "MAX_RETRIES".into(),
            reason: format!("must be between 0 and {MAX_RETRIES}"),
        });
    }

    if config.retry_base_delay_ms == 0 || config.retry_base_delay_ms > MAX_RETRY_BASE_DELAY_MS {
        return Err(ConfigError::InvalidValue {
            var: "RETRY_BASE_DELAY_MS".into(),
            reason: format!("must be between 1 and {MAX_RETRY_BASE_DELAY_MS} ms"),
        });
    }

    if config.busy_timeout_ms < MIN_BUSY_TIMEOUT_MS || config.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS
    {
        return Err(ConfigError::InvalidValue {
            var: "BUSY_TIMEOUT_MS".into(),
            reason: format!("must be between {MIN_BUSY_TIMEOUT_MS} and {MAX_BUSY_TIMEOUT_MS} ms"),
        });
    }

    if config.max_connections == 0 || config.max_connections > MAX_CONNECTIONS {
        return Err(ConfigError::InvalidValue {
            var: "MAX_CONNECTIONS".into(),
            reason: format!("must be between 1 and {MAX_CONNECTIONS}"),
        });
    }

    Ok(())
}
