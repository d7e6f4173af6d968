//! Integration tests for the assessment scoring server.
//!
//! These tests run against a real `SQLite` file in a temporary directory.

mod concurrency;
mod error_recovery;
mod grading_workflow;
mod protocol;
