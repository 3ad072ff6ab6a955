// crates/vpc-assert-core/src/runtime/report.rs
// ============================================================================
// Module: VPC Assert Report Aggregator
// Description: Order-preserving aggregation of findings into a report.
// Purpose: Derive overall and per-control status plus a stable digest.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Aggregation never reorders or drops findings. Summaries are a pure fold
//! over verdicts, and the digest covers the canonical JSON of the findings so
//! identical runs produce identical digests. Findings that cannot be
//! serialized leave the report without a digest and add an error finding, so
//! the run cannot pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::finding::ControlSummary;
use crate::core::finding::Finding;
use crate::core::finding::Report;
use crate::core::finding::ReportSummary;
use crate::core::finding::FindingKind;
use crate::core::finding::Verdict;
use crate::core::hashing::CanonicalJsonError;
use crate::core::hashing::HashDigest;
use crate::core::identifiers::ControlName;
use crate::core::identifiers::ResourceId;

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Control name carried by the digest failure finding.
const REPORT_CONTROL: &str = "report";

/// Aggregates findings into a report.
#[must_use]
pub fn aggregate(findings: Vec<Finding>) -> Report {
    let digest = HashDigest::of_canonical_json(&findings);
    assemble(findings, digest)
}

/// Builds the report from findings and the outcome of digesting them.
fn assemble(mut findings: Vec<Finding>, digest: Result<HashDigest, CanonicalJsonError>) -> Report {
    let digest = match digest {
        Ok(digest) => Some(digest),
        Err(err) => {
            findings.push(digest_failure(&err));
            None
        }
    };

    let mut summary = ReportSummary::default();
    let mut order: Vec<ControlName> = Vec::new();
    let mut per_control: BTreeMap<ControlName, ReportSummary> = BTreeMap::new();

    for finding in &findings {
        summary.record(finding.verdict);
        let entry = per_control.entry(finding.control.clone()).or_insert_with(|| {
            order.push(finding.control.clone());
            ReportSummary::default()
        });
        entry.record(finding.verdict);
    }

    let controls = order
        .into_iter()
        .map(|control| {
            let summary = per_control.get(&control).copied().unwrap_or_default();
            ControlSummary {
                control,
                summary,
                status: summary.status(),
            }
        })
        .collect();

    Report {
        status: summary.status(),
        summary,
        controls,
        digest,
        findings,
    }
}

/// Error finding recorded when the findings cannot be digested.
fn digest_failure(err: &CanonicalJsonError) -> Finding {
    Finding::new(
        &ControlName::new(REPORT_CONTROL),
        &ResourceId::new("digest"),
        FindingKind::Structural,
    )
    .with_verdict(Verdict::Error)
    .with_message(format!("report digest unavailable: {err}"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
