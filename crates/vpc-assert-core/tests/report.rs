// crates/vpc-assert-core/tests/report.rs
// ============================================================================
// Module: Report Aggregation Tests
// Description: Status precedence, per-control summaries, and digests.
// Purpose: Ensure reports are deterministic pure functions of their findings.
// Dependencies: vpc-assert-core
// ============================================================================
//! ## Overview
//! Validates aggregation over hand-built findings.

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

use vpc_assert_core::ControlName;
use vpc_assert_core::Finding;
use vpc_assert_core::FindingKind;
use vpc_assert_core::HashAlgorithm;
use vpc_assert_core::ReportStatus;
use vpc_assert_core::ResourceId;
use vpc_assert_core::Verdict;
use vpc_assert_core::aggregate;

/// Builds a finding with the given control and verdict.
fn finding(control: &str, verdict: Verdict) -> Finding {
    Finding::new(&ControlName::new(control), &ResourceId::new("r"), FindingKind::Field)
        .with_verdict(verdict)
        .with_message(verdict.as_str())
}

/// Verifies an empty run passes.
#[test]
fn empty_report_passes() {
    let report = aggregate(Vec::new());
    assert_eq!(report.status, ReportStatus::Pass);
    assert_eq!(report.summary.total, 0);
    assert!(report.controls.is_empty());
}

/// Verifies errors take precedence over failures.
#[test]
fn error_precedes_fail() {
    let report = aggregate(vec![
        finding("networks", Verdict::Pass),
        finding("subnets", Verdict::Fail),
        finding("routes", Verdict::Error),
    ]);
    assert_eq!(report.status, ReportStatus::Error);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.errored, 1);
    assert_eq!(report.problems().count(), 2);
}

/// Verifies per-control summaries keep first-appearance order.
#[test]
fn control_summaries_keep_order() {
    let report = aggregate(vec![
        finding("subnets", Verdict::Pass),
        finding("networks", Verdict::Fail),
        finding("subnets", Verdict::Fail),
    ]);
    let names: Vec<_> = report.controls.iter().map(|c| c.control.as_str()).collect();
    assert_eq!(names, vec!["subnets", "networks"]);
    assert_eq!(report.controls[0].summary.total, 2);
    assert_eq!(report.controls[0].status, ReportStatus::Fail);
    assert_eq!(report.status, ReportStatus::Fail);
}

/// Verifies identical findings hash identically and order changes the digest.
#[test]
fn digest_is_deterministic() {
    let first = aggregate(vec![finding("a", Verdict::Pass), finding("b", Verdict::Fail)]);
    let second = aggregate(vec![finding("a", Verdict::Pass), finding("b", Verdict::Fail)]);
    let swapped = aggregate(vec![finding("b", Verdict::Fail), finding("a", Verdict::Pass)]);
    assert_eq!(first.digest, second.digest);
    assert_ne!(first.digest, swapped.digest);
}

/// Verifies the digest is lowercase SHA-256 hex over the findings.
#[test]
fn digest_is_sha256_hex() {
    let report = aggregate(vec![finding("a", Verdict::Pass)]);
    let digest = report.digest.expect("digest");
    assert_eq!(digest.algorithm, HashAlgorithm::Sha256);
    assert_eq!(digest.value.len(), 64);
    assert!(digest.value.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
    assert_eq!(report.status, ReportStatus::Pass);
}
