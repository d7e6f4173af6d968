//! Server orchestration.
//!
//! Wires storage, the recorder and its hooks together and serves the line
//! protocol over stdio.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::scoring::{AssessmentRecorder, AuditEventHook, LoggingProgressTracker, ProgressHook};
use crate::storage::SqliteStorage;
use crate::traits::{RealTimeProvider, TimeProvider};

use super::handler::RequestHandler;
use super::transport::LineTransport;
use super::types::AppState;

/// The scoring server.
#[derive(Debug)]
pub struct ScoringServer {
    config: Config,
}

impl ScoringServer {
    /// Creates a new server with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Build the request handler over `storage`.
    ///
    /// The recorder gets the configured retry policy, the audit-event hook
    /// and a logging progress tracker.
    #[must_use]
    pub fn handler(&self, storage: SqliteStorage) -> RequestHandler {
        let time: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
        let recorder = AssessmentRecorder::new(storage.clone())
            .with_retry_policy(self.config.retry_policy())
            .with_time_provider(time.clone())
            .with_hook(Arc::new(AuditEventHook::new(storage, time)))
            .with_hook(Arc::new(ProgressHook::new(LoggingProgressTracker)));

        RequestHandler::new(AppState::new(recorder))
    }

    /// Open storage and serve stdin until it closes or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if storage initialization fails or stdio breaks.
    pub async fn run_stdio(&self) -> Result<(), AppError> {
        let storage = SqliteStorage::from_config(&self.config).await?;
        let handler = self.handler(storage);

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        let transport = LineTransport::new();

        tokio::select! {
            result = transport.serve(&handler, stdin, stdout) => {
                let handled = result?;
                tracing::info!(handled, "stdin closed");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
            }
        }

        Ok(())
    }
}
