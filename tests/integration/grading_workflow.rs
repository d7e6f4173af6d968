//! Grading workflow tests.
//!
//! Enroll a learner, submit mid-course and final assessments, and check the
//! stored scores and verdicts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use assessment_scoring::scoring::{
    AssessmentRecorder, AssessmentResult, AuditEventHook, OVERALL_SCORE_KEY,
};
use assessment_scoring::storage::SqliteStorage;
use assessment_scoring::traits::{RealTimeProvider, TimeProvider};
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

#[tokio::test]
#[serial]
async fn test_mid_then_final_fail() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    recorder.record("l-1", "Mid", json!(["a"]), 80.0).await.expect("mid");
    let outcome = recorder.record("l-1", "Fin", json!(["b"]), 60.0).await.expect("fin");

    assert_eq!(outcome.result, Some(AssessmentResult::Fail));
    let profile = storage.get_learner("l-1").await.unwrap().unwrap();
    assert_eq!(profile.scores.get("Mid"), Some(&80));
    assert_eq!(profile.scores.get("Fin"), Some(&60));
    assert_eq!(profile.scores.get(OVERALL_SCORE_KEY), Some(&66));
}

#[tokio::test]
#[serial]
async fn test_final_retake_raises_grade_to_pass() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    recorder.record("l-1", "Mid", json!([]), 80.0).await.expect("mid");
    let first = recorder.record("l-1", "Fin", json!([]), 60.0).await.expect("fin");
    let retake = recorder.record("l-1", "Fin", json!([]), 90.0).await.expect("retake");
    let worse = recorder.record("l-1", "Fin", json!([]), 10.0).await.expect("worse");

    assert_eq!(first.overall_score(), Some(66));
    assert_eq!(retake.overall_score(), Some(87));
    assert_eq!(retake.result, Some(AssessmentResult::Pass));
    // The best final score still drives the grade.
    assert_eq!(worse.overall_score(), Some(87));
    assert_eq!(worse.result, Some(AssessmentResult::Pass));
    assert!(!worse.update.changed);
}

#[tokio::test]
#[serial]
async fn test_final_without_midcourse_counts_mid_as_zero() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    let outcome = recorder.record("l-1", "Fin", json!([]), 99.6).await.expect("fin");

    // round(99.6) = 100, floor(0.7 * 100) = 70
    assert_eq!(outcome.update.score, 100);
    assert_eq!(outcome.overall_score(), Some(70));
    assert_eq!(outcome.result, Some(AssessmentResult::Pass));
    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), None);
}

#[tokio::test]
#[serial]
async fn test_midcourse_after_final_does_not_regrade() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    recorder.record("l-1", "Fin", json!([]), 90.0).await.expect("fin");
    recorder.record("l-1", "Mid", json!([]), 100.0).await.expect("mid");

    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), Some(100));
    assert_eq!(
        storage.get_score("l-1", OVERALL_SCORE_KEY).await.unwrap(),
        Some(63)
    );

    recorder.record("l-1", "Fin", json!([]), 90.0).await.expect("fin again");
    assert_eq!(
        storage.get_score("l-1", OVERALL_SCORE_KEY).await.unwrap(),
        Some(93)
    );
}

#[tokio::test]
#[serial]
async fn test_answers_track_latest_per_type() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = AssessmentRecorder::new(storage.clone());

    recorder.record("l-1", "Mid", json!(["m1"]), 90.0).await.expect("mid");
    recorder.record("l-1", "Quiz", json!({"q": 1}), 50.0).await.expect("quiz");
    recorder.record("l-1", "Mid", json!(["m2"]), 20.0).await.expect("mid again");

    let answers = storage.get_answers("l-1").await.unwrap().unwrap();
    assert_eq!(answers.answer("Mid"), Some(&json!(["m2"])));
    assert_eq!(answers.answer("Quiz"), Some(&json!({"q": 1})));
    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), Some(90));
}

#[tokio::test]
#[serial]
async fn test_audit_events_follow_submissions() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let time: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let recorder = AssessmentRecorder::new(storage.clone())
        .with_hook(Arc::new(AuditEventHook::new(storage.clone(), time)));

    recorder.record("l-1", "Mid", json!([1]), 40.0).await.expect("mid");
    recorder.record("l-1", "Fin", json!([2]), 80.0).await.expect("fin");

    let events = storage.get_events("l-1").await.unwrap();
    let types: Vec<_> = events.iter().map(|e| e.payload["type"].clone()).collect();
    assert_eq!(types, vec![json!("assessment-Mid"), json!("assessment-Fin")]);
}

#[tokio::test]
#[serial]
async fn test_scores_survive_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("reopen.db");

    {
        let storage = SqliteStorage::new(&db_path).await.expect("open");
        storage.enroll_learner("l-1").await.expect("enroll");
        AssessmentRecorder::new(storage)
            .record("l-1", "Mid", json!([]), 77.0)
            .await
            .expect("mid");
    }

    let reopened = SqliteStorage::new(&db_path).await.expect("reopen");
    assert_eq!(reopened.get_score("l-1", "Mid").await.unwrap(), Some(77));
}
