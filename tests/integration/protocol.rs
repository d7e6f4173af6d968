//! Line protocol tests.
//!
//! Drives the transport with in-memory buffers over a file-backed database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assessment_scoring::config::Config;
use assessment_scoring::server::{LineTransport, ScoringServer};
use assessment_scoring::storage::SqliteStorage;
use serde_json::Value;
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

async fn run(storage: SqliteStorage, input: &str) -> Vec<Value> {
    let handler = ScoringServer::new(Config::default()).handler(storage);
    let mut output = Vec::new();
    LineTransport::new()
        .serve(&handler, input.as_bytes(), &mut output)
        .await
        .expect("serve");

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
#[serial]
async fn test_full_session() {
    let (storage, _temp_dir) = create_test_storage().await;
    let input = [
        r#"{"op":"enroll","learner_id":"l-1"}"#,
        r#"{"op":"submit","learner_id":"l-1","assessment_type":"Mid","answers":"[\"a\"]","score":"80"}"#,
        r#"{"op":"submit","learner_id":"l-1","assessment_type":"Fin","answers":"[\"b\"]","score":"60"}"#,
        r#"{"op":"get_learner","learner_id":"l-1"}"#,
    ]
    .join("\n");

    let responses = run(storage.clone(), &input).await;

    assert_eq!(responses.len(), 4);
    assert!(responses.iter().all(|r| r["ok"] == Value::Bool(true)));
    assert_eq!(responses[2]["submission"]["result"], "fail");
    assert_eq!(responses[2]["submission"]["overall_score"], 66);
    assert_eq!(responses[3]["learner"]["scores"]["overall_score"], 66);

    // The audit hook runs once per committed submission.
    assert_eq!(storage.get_events("l-1").await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_errors_do_not_stop_the_session() {
    let (storage, _temp_dir) = create_test_storage().await;
    let input = [
        "not json at all",
        r#"{"op":"submit","learner_id":"ghost","assessment_type":"Mid","score":"50"}"#,
        r#"{"op":"enroll","learner_id":"l-1"}"#,
        r#"{"op":"submit","learner_id":"l-1","score":"50"}"#,
        r#"{"op":"submit","learner_id":"l-1","assessment_type":"Mid","score":50}"#,
    ]
    .join("\n");

    let responses = run(storage, &input).await;

    let kinds: Vec<_> = responses
        .iter()
        .map(|r| r["error"]["kind"].as_str().unwrap_or("ok").to_string())
        .collect();
    assert_eq!(kinds, vec!["bad_request", "not_found", "ok", "validation", "ok"]);
}
