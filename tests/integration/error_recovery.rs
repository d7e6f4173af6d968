//! Error recovery and edge case tests.
//!
//! Failed submissions must leave both records exactly as they were.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use assessment_scoring::error::{HookError, ScoringError, StorageError};
use assessment_scoring::scoring::{AssessmentRecorder, ProgressHook};
use assessment_scoring::storage::SqliteStorage;
use assessment_scoring::traits::ProgressTracker;
use async_trait::async_trait;
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

/// Create a test database in a temporary directory.
async fn create_test_storage() -> (SqliteStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let storage = SqliteStorage::new(&db_path)
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

struct OfflineTracker;

#[async_trait]
impl ProgressTracker for OfflineTracker {
    async fn put_assessment_completed(&self, _: &str, _: &str) -> Result<(), HookError> {
        Err(HookError::new("progress", "tracker offline"))
    }
}

#[tokio::test]
#[serial]
async fn test_unknown_learner_writes_nothing() {
    let (storage, _temp_dir) = create_test_storage().await;
    let recorder = AssessmentRecorder::new(storage.clone());

    let err = recorder
        .record("ghost", "Fin", json!(["x"]), 95.0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ScoringError::NotFound {
            learner_id: "ghost".to_string()
        }
    );
    assert!(storage.get_learner("ghost").await.unwrap().is_none());
    assert!(storage.get_answers("ghost").await.unwrap().is_none());
    assert!(storage.get_events("ghost").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_get_score_for_unknown_learner() {
    let (storage, _temp_dir) = create_test_storage().await;
    let err = storage.get_score("ghost", "Mid").await.unwrap_err();
    assert!(matches!(err, StorageError::LearnerNotFound { .. }));
}

#[tokio::test]
#[serial]
async fn test_invalid_submission_writes_nothing() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    let err = recorder
        .record("l-1", "Mid", json!([]), f64::NAN)
        .await
        .unwrap_err();

    assert!(matches!(err, ScoringError::Validation { .. }));
    assert!(storage.get_answers("l-1").await.unwrap().is_none());
    let profile = storage.get_learner("l-1").await.unwrap().unwrap();
    assert!(profile.scores.is_empty());
}

#[tokio::test]
#[serial]
async fn test_overall_score_cannot_be_submitted_directly() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    let err = recorder
        .record("l-1", "overall_score", json!([]), 100.0)
        .await
        .unwrap_err();

    assert!(matches!(err, ScoringError::Validation { .. }));
}

#[tokio::test]
#[serial]
async fn test_failed_progress_tracker_keeps_commit() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone())
        .with_hook(Arc::new(ProgressHook::new(OfflineTracker)));

    let outcome = recorder.record("l-1", "Mid", json!([]), 72.0).await;

    assert!(outcome.is_ok());
    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), Some(72));
}

#[tokio::test]
#[serial]
async fn test_enroll_twice_is_rejected() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");

    let err = storage.enroll_learner("l-1").await.unwrap_err();
    assert_eq!(
        err,
        StorageError::LearnerExists {
            learner_id: "l-1".to_string()
        }
    );
}
