//! Concurrent submission tests.
//!
//! Several tasks submit for the same learner through a shared file-backed
//! pool. Every submission must commit exactly once and the stored score must
//! be the maximum of everything submitted. A writer that cannot get the
//! lock in time must surface a conflict and leave nothing behind.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use assessment_scoring::config::Config;
use assessment_scoring::error::ScoringError;
use assessment_scoring::scoring::{AssessmentRecorder, RetryPolicy, OVERALL_SCORE_KEY};
use assessment_scoring::storage::SqliteStorage;
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

fn recorder(storage: SqliteStorage) -> Arc<AssessmentRecorder> {
    Arc::new(
        AssessmentRecorder::new(storage)
            .with_retry_policy(RetryPolicy::new(10, Duration::from_millis(5))),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_submissions_keep_maximum() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = recorder(storage.clone());

    let scores: Vec<f64> = vec![12.0, 88.0, 45.0, 91.0, 67.0, 30.0, 90.0, 5.0];
    let mut handles = Vec::new();
    for score in scores.clone() {
        let recorder = Arc::clone(&recorder);
        handles.push(tokio::spawn(async move {
            recorder
                .record("l-1", "Mid", json!([score]), score)
                .await
        }));
    }

    for handle in handles {
        handle.await.expect("task").expect("submission");
    }

    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), Some(91));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_concurrent_mid_and_final_stay_consistent() {
    let (storage, _temp_dir) = create_test_storage().await;
    storage.enroll_learner("l-1").await.expect("enroll");
    let recorder = recorder(storage.clone());

    let mid = {
        let recorder = Arc::clone(&recorder);
        tokio::spawn(async move { recorder.record("l-1", "Mid", json!(["m"]), 80.0).await })
    };
    let fin = {
        let recorder = Arc::clone(&recorder);
        tokio::spawn(async move { recorder.record("l-1", "Fin", json!(["f"]), 90.0).await })
    };

    mid.await.expect("task").expect("mid");
    fin.await.expect("task").expect("fin");

    let profile = storage.get_learner("l-1").await.unwrap().unwrap();
    assert_eq!(profile.scores.get("Mid"), Some(&80));
    assert_eq!(profile.scores.get("Fin"), Some(&90));

    // Fin either committed before Mid (mid counted as 0) or after it.
    let overall = profile.scores.get(OVERALL_SCORE_KEY).copied();
    assert!(matches!(overall, Some(63 | 87)), "overall = {overall:?}");

    let answers = storage.get_answers("l-1").await.unwrap().unwrap();
    assert_eq!(answers.answer("Mid"), Some(&json!(["m"])));
    assert_eq!(answers.answer("Fin"), Some(&json!(["f"])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_different_learners_do_not_interfere() {
    let (storage, _temp_dir) = create_test_storage().await;
    for id in ["a", "b", "c"] {
        storage.enroll_learner(id).await.expect("enroll");
    }
    let recorder = recorder(storage.clone());

    let mut handles = Vec::new();
    for (id, score) in [("a", 10.0), ("b", 20.0), ("c", 30.0), ("a", 15.0), ("b", 5.0)] {
        let recorder = Arc::clone(&recorder);
        handles.push(tokio::spawn(async move {
            recorder.record(id, "Quiz", json!([]), score).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("submission");
    }

    assert_eq!(storage.get_score("a", "Quiz").await.unwrap(), Some(15));
    assert_eq!(storage.get_score("b", "Quiz").await.unwrap(), Some(20));
    assert_eq!(storage.get_score("c", "Quiz").await.unwrap(), Some(30));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_locked_database_exhausts_retries_without_partial_write() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        database_path: temp_dir.path().join("locked.db").display().to_string(),
        busy_timeout_ms: 100,
        ..Config::default()
    };
    let storage = SqliteStorage::from_config(&config)
        .await
        .expect("Failed to create storage");
    storage.enroll_learner("l-1").await.expect("enroll");

    // Another connection holds the write lock for the whole attempt budget.
    let mut holder = storage.get_pool().acquire().await.expect("acquire");
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *holder)
        .await
        .expect("lock");

    let recorder = AssessmentRecorder::new(storage.clone())
        .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(5)));
    let result = recorder.record("l-1", "Mid", json!(["a"]), 80.0).await;

    assert_eq!(
        result.unwrap_err(),
        ScoringError::Conflict {
            learner_id: "l-1".to_string(),
            attempts: 2,
        }
    );

    sqlx::query("ROLLBACK")
        .execute(&mut *holder)
        .await
        .expect("unlock");
    drop(holder);

    let profile = storage.get_learner("l-1").await.unwrap().unwrap();
    assert!(profile.scores.is_empty());
    assert!(storage.get_answers("l-1").await.unwrap().is_none());

    // Once the lock is gone the same submission goes through.
    let outcome = recorder
        .record("l-1", "Mid", json!(["a"]), 80.0)
        .await
        .expect("record after unlock");
    assert_eq!(outcome.attempts, 1);
    assert_eq!(storage.get_score("l-1", "Mid").await.unwrap(), Some(80));
}
