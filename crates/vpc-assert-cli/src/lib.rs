// crates/vpc-assert-cli/src/lib.rs
// ============================================================================
// Module: VPC Assert CLI Library
// Description: Localization, rendering, and exit-code helpers for the CLI.
// Purpose: Keep presentation logic testable outside the binary.
// Dependencies: clap, serde_json, thiserror, vpc-assert-core
// ============================================================================

//! ## Overview
//! Shared pieces of the `vpc-assert` binary: the message catalog behind the
//! [`t!`] macro, report and plan renderers, and the mapping from report
//! status to process exit codes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod render;

// ============================================================================
// SECTION: Imports
// ============================================================================

use vpc_assert_core::ReportStatus;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Every finding passed.
pub const EXIT_PASS: u8 = 0;
/// At least one assertion failed and nothing errored.
pub const EXIT_FAIL: u8 = 1;
/// Provider or structural errors are present in the report.
pub const EXIT_ERROR: u8 = 2;
/// Configuration, snapshot, or builder failure before a report exists.
pub const EXIT_FATAL: u8 = 3;

/// Maps a report status to its process exit code.
#[must_use]
pub const fn exit_code(status: ReportStatus) -> u8 {
    match status {
        ReportStatus::Pass => EXIT_PASS,
        ReportStatus::Fail => EXIT_FAIL,
        ReportStatus::Error => EXIT_ERROR,
    }
}
