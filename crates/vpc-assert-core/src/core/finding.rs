// crates/vpc-assert-core/src/core/finding.rs
// ============================================================================
// Module: VPC Assert Findings
// Description: Assertion findings, verdicts, and report structures.
// Purpose: Record every comparison with its expected and observed values.
// Dependencies: serde, serde_json, crate::core::{hashing, identifiers}
// ============================================================================

//! ## Overview
//! A [`Finding`] is the outcome of exactly one comparison. Assertion
//! mismatches use [`Verdict::Fail`]; provider and structural failures use
//! [`Verdict::Error`] so a report can tell an unreachable resource apart from
//! a misconfigured one. A [`Report`] is the ordered list of findings plus its
//! derived summaries and digest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::ControlName;
use crate::core::identifiers::ResourceId;

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Outcome of a single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Observed state satisfied the expectation.
    Pass,
    /// Observed state violated the expectation.
    Fail,
    /// The comparison could not run (provider or structural error).
    Error,
}

impl Verdict {
    /// Maps a boolean comparison result to a verdict.
    #[must_use]
    pub const fn from_bool(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }

    /// Returns the stable label for the verdict.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// Category of the comparison that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Number of matching resources.
    Count,
    /// Single field predicate.
    Field,
    /// Shape of an identifier or output value.
    Structural,
    /// Provider failure while fetching observed state.
    Provider,
    /// Agreement between two representations of the same data.
    Consistency,
}

impl FindingKind {
    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Field => "field",
            Self::Structural => "structural",
            Self::Provider => "provider",
            Self::Consistency => "consistency",
        }
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// One comparison outcome with its expected and observed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Control that produced the finding.
    pub control: ControlName,
    /// Resource instance the finding refers to.
    pub resource: ResourceId,
    /// Field path, or `None` for count and whole-resource checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Comparison category.
    pub kind: FindingKind,
    /// Expected value.
    pub expected: Value,
    /// Observed value.
    pub observed: Value,
    /// Comparison outcome.
    pub verdict: Verdict,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// Creates a passing finding with null values and an empty message.
    #[must_use]
    pub fn new(control: &ControlName, resource: &ResourceId, kind: FindingKind) -> Self {
        Self {
            control: control.clone(),
            resource: resource.clone(),
            field: None,
            kind,
            expected: Value::Null,
            observed: Value::Null,
            verdict: Verdict::Pass,
            message: String::new(),
        }
    }

    /// Sets the field path.
    #[must_use]
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the expected and observed values.
    #[must_use]
    pub fn with_values(mut self, expected: Value, observed: Value) -> Self {
        self.expected = expected;
        self.observed = observed;
        self
    }

    /// Sets the verdict.
    #[must_use]
    pub const fn with_verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = verdict;
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Returns true when the verdict is [`Verdict::Pass`].
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Overall status derived from a set of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every finding passed.
    Pass,
    /// At least one finding failed and none errored.
    Fail,
    /// At least one finding errored.
    Error,
}

impl ReportStatus {
    /// Returns the stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// Verdict counts for a group of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total findings.
    pub total: usize,
    /// Passing findings.
    pub passed: usize,
    /// Failing findings.
    pub failed: usize,
    /// Errored findings.
    pub errored: usize,
}

impl ReportSummary {
    /// Adds one verdict to the counts.
    pub const fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Error => self.errored += 1,
        }
    }

    /// Derives the status from the counts.
    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        if self.errored > 0 {
            ReportStatus::Error
        } else if self.failed > 0 {
            ReportStatus::Fail
        } else {
            ReportStatus::Pass
        }
    }
}

/// Summary for one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSummary {
    /// Control name.
    pub control: ControlName,
    /// Verdict counts for the control.
    pub summary: ReportSummary,
    /// Derived control status.
    pub status: ReportStatus,
}

/// Final evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Overall status.
    pub status: ReportStatus,
    /// Overall verdict counts.
    pub summary: ReportSummary,
    /// Per-control summaries in first-appearance order.
    pub controls: Vec<ControlSummary>,
    /// Findings in evaluation order.
    pub findings: Vec<Finding>,
    /// Digest of the canonical JSON of `findings`, or `None` when the
    /// findings could not be serialized.
    pub digest: Option<HashDigest>,
}

impl Report {
    /// Returns findings that did not pass.
    pub fn problems(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| !finding.passed())
    }
}
