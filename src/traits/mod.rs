//! Trait definitions for mockable collaborators.
//!
//! This module defines traits for:
//! - [`ProgressTracker`]: Course progress bookkeeping, notified after commit
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! # Mocking
//!
//! Both traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use assessment_scoring::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HookError;

/// Progress tracker collaborator.
///
/// Records that a learner completed an assessment. Called only after the
/// scoring transaction has committed; a failure here never rolls it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Mark `assessment_type` as completed for `learner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError`] on failure; the caller logs it.
    async fn put_assessment_completed(
        &self,
        learner_id: &str,
        assessment_type: &str,
    ) -> Result<(), HookError>;
}

/// Time provider trait for deterministic testing.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
