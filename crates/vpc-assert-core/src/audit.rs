// crates/vpc-assert-core/src/audit.rs
// ============================================================================
// Module: VPC Assert Audit Logging
// Description: Structured audit events for evaluation runs and provider fetches.
// Purpose: Emit JSON-line logs without binding to a logging framework.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for evaluation runs.
//! Each event serializes to one JSON line so deployments can route it to
//! their preferred logging pipeline. Sink failures never affect a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::finding::Report;
use crate::core::finding::ReportStatus;
use crate::core::finding::ReportSummary;
use crate::core::resource::ResourceClass;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Run lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RunAuditEvent {
    /// Event identifier (`run_started` or `run_finished`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Number of controls in the plan.
    pub controls: usize,
    /// Number of planned checks across all controls.
    pub checks: usize,
    /// Final status when the run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    /// Final verdict counts when the run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReportSummary>,
    /// Report digest when the run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl RunAuditEvent {
    /// Creates a `run_started` event.
    #[must_use]
    pub fn started(controls: usize, checks: usize) -> Self {
        Self {
            event: "run_started",
            timestamp_ms: now_ms(),
            controls,
            checks,
            status: None,
            summary: None,
            digest: None,
        }
    }

    /// Creates a `run_finished` event from the final report.
    #[must_use]
    pub fn finished(controls: usize, checks: usize, report: &Report) -> Self {
        Self {
            event: "run_finished",
            timestamp_ms: now_ms(),
            controls,
            checks,
            status: Some(report.status),
            summary: Some(report.summary),
            digest: report.digest.as_ref().map(|digest| digest.value.clone()),
        }
    }
}

/// Provider fetch audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct FetchAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Control that requested the fetch.
    pub control: String,
    /// Resource instance label.
    pub resource: String,
    /// Queried resource class.
    pub class: ResourceClass,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Fetch outcome label (`ok` or `error`).
    pub outcome: &'static str,
    /// Number of matching resources on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<usize>,
    /// Normalized error kind label on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Wall-clock duration of the attempt.
    pub duration_ms: u128,
}

/// Inputs required to construct a fetch audit event.
pub struct FetchAuditEventParams {
    /// Control that requested the fetch.
    pub control: String,
    /// Resource instance label.
    pub resource: String,
    /// Queried resource class.
    pub class: ResourceClass,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Number of matches on success.
    pub matched: Option<usize>,
    /// Error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// Attempt duration in milliseconds.
    pub duration_ms: u128,
}

impl FetchAuditEvent {
    /// Creates a new fetch audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: FetchAuditEventParams) -> Self {
        let outcome = if params.error_kind.is_some() { "error" } else { "ok" };
        Self {
            event: "fetch",
            timestamp_ms: now_ms(),
            control: params.control,
            resource: params.resource,
            class: params.class,
            attempt: params.attempt,
            outcome,
            matched: params.matched,
            error_kind: params.error_kind,
            duration_ms: params.duration_ms,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for evaluation events.
pub trait AuditSink: Send + Sync {
    /// Record a run lifecycle event.
    fn record_run(&self, event: &RunAuditEvent);

    /// Record a provider fetch event.
    fn record_fetch(&self, _event: &FetchAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_run(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_fetch(&self, event: &FetchAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event as a line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_run(&self, event: &RunAuditEvent) {
        self.append(event);
    }

    fn record_fetch(&self, event: &FetchAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_run(&self, _event: &RunAuditEvent) {}

    fn record_fetch(&self, _event: &FetchAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
