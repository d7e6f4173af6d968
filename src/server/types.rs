//! Shared server state.

use std::sync::Arc;

use crate::scoring::AssessmentRecorder;
use crate::storage::SqliteStorage;

/// Shared application state for request handling.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for reads and enrollment.
    pub storage: SqliteStorage,
    /// Recorder for submissions.
    pub recorder: Arc<AssessmentRecorder>,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// The recorder's storage is shared for reads and enrollment.
    #[must_use]
    pub fn new(recorder: AssessmentRecorder) -> Self {
        Self {
            storage: recorder.storage().clone(),
            recorder: Arc::new(recorder),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}
