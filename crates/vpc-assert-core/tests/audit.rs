// crates/vpc-assert-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: JSON-line output of the file audit sink.
// Purpose: Ensure audit events are appended one object per line.
// Dependencies: vpc-assert-core, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Writes run and fetch events to a temporary log and parses them back.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use serde_json::Value;
use serde_json::json;
use vpc_assert_core::AuditSink;
use vpc_assert_core::FetchAuditEvent;
use vpc_assert_core::FileAuditSink;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::RunAuditEvent;
use vpc_assert_core::aggregate;
use vpc_assert_core::audit::FetchAuditEventParams;

/// Reads every JSON line from `path`.
fn read_lines(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Verifies events are appended as one JSON object per line.
#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = FileAuditSink::new(&path).unwrap();
    sink.record_run(&RunAuditEvent::started(2, 3));
    sink.record_fetch(&FetchAuditEvent::new(FetchAuditEventParams {
        control: "networks".to_string(),
        resource: "network[prod-net]".to_string(),
        class: ResourceClass::Network,
        attempt: 1,
        matched: None,
        error_kind: Some("timeout"),
        duration_ms: 12,
    }));
    let report = aggregate(Vec::new());
    sink.record_run(&RunAuditEvent::finished(2, 3, &report));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], json!("run_started"));
    assert!(lines[0].get("status").is_none());
    assert_eq!(lines[1]["event"], json!("fetch"));
    assert_eq!(lines[1]["outcome"], json!("error"));
    assert_eq!(lines[1]["error_kind"], json!("timeout"));
    assert_eq!(lines[2]["event"], json!("run_finished"));
    assert_eq!(lines[2]["digest"], json!(report.digest.as_ref().unwrap().value));
}

/// Verifies reopening the log appends rather than truncates.
#[test]
fn file_sink_reopen_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    FileAuditSink::new(&path).unwrap().record_run(&RunAuditEvent::started(1, 1));
    FileAuditSink::new(&path).unwrap().record_run(&RunAuditEvent::started(1, 2));
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["checks"], json!(2));
}
