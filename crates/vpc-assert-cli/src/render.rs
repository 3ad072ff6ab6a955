// crates/vpc-assert-cli/src/render.rs
// ============================================================================
// Module: Report Rendering
// Description: Text, Markdown, and canonical JSON output for reports and plans.
// Purpose: Present evaluation results without altering their content.
// Dependencies: clap, serde_json, thiserror, vpc-assert-core
// ============================================================================

//! ## Overview
//! Rendering is a pure function of a [`Report`] or [`EvaluationPlan`]. JSON
//! output is canonical (RFC 8785) so it can be diffed and hashed; text and
//! Markdown list every control and every finding that did not pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;
use vpc_assert_core::EvaluationPlan;
use vpc_assert_core::Finding;
use vpc_assert_core::PlannedCheck;
use vpc_assert_core::Report;
use vpc_assert_core::ReportSummary;
use vpc_assert_core::hashing::canonical_json_bytes;

use crate::t;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Output formats supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Canonical JSON.
    Json,
    /// Markdown tables.
    Markdown,
}

/// Rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Canonical JSON serialization failed.
    #[error("canonical json failed: {0}")]
    Canonical(String),
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Renders a report in the requested format.
///
/// # Errors
///
/// Returns [`RenderError`] when canonical JSON serialization fails.
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Json => canonical(report),
        OutputFormat::Text => Ok(report_text(report)),
        OutputFormat::Markdown => Ok(report_markdown(report)),
    }
}

/// Renders a report as plain text.
fn report_text(report: &Report) -> String {
    let mut buffer = String::new();
    push_line(&mut buffer, &t!("report.title"));
    push_line(&mut buffer, &t!("report.status", status = report.status.as_str()));
    push_line(&mut buffer, &summary_line(&report.summary));
    buffer.push('\n');
    push_line(&mut buffer, &t!("report.controls"));
    for control in &report.controls {
        push_line(
            &mut buffer,
            &t!(
                "report.control.line",
                status = control.status.as_str(),
                control = control.control,
                passed = control.summary.passed,
                total = control.summary.total
            ),
        );
    }
    buffer.push('\n');
    push_line(&mut buffer, &t!("report.problems"));
    let mut any = false;
    for finding in report.problems() {
        any = true;
        push_line(
            &mut buffer,
            &t!(
                "report.problem.line",
                verdict = finding.verdict.as_str(),
                control = finding.control,
                target = target(finding),
                message = finding.message
            ),
        );
        push_line(
            &mut buffer,
            &t!(
                "report.problem.values",
                expected = compact(&finding.expected),
                observed = compact(&finding.observed)
            ),
        );
    }
    if !any {
        push_line(&mut buffer, &t!("report.problems.none"));
    }
    buffer.push('\n');
    push_line(&mut buffer, &digest_line(report));
    buffer
}

/// Renders a report as Markdown.
fn report_markdown(report: &Report) -> String {
    let mut buffer = String::new();
    push_line(&mut buffer, &format!("# {}", t!("report.title")));
    buffer.push('\n');
    push_line(&mut buffer, &format!("**{}**", t!("report.status", status = report.status.as_str())));
    buffer.push('\n');
    push_line(&mut buffer, &summary_line(&report.summary));
    buffer.push('\n');
    push_line(&mut buffer, &format!("## {}", t!("report.controls")));
    buffer.push('\n');
    push_row(
        &mut buffer,
        &[
            t!("report.column.control"),
            t!("report.column.status"),
            t!("report.column.passed"),
            t!("report.column.failed"),
            t!("report.column.errored"),
        ],
    );
    push_line(&mut buffer, "| --- | --- | ---: | ---: | ---: |");
    for control in &report.controls {
        push_row(
            &mut buffer,
            &[
                control.control.to_string(),
                control.status.as_str().to_string(),
                control.summary.passed.to_string(),
                control.summary.failed.to_string(),
                control.summary.errored.to_string(),
            ],
        );
    }
    buffer.push('\n');
    push_line(&mut buffer, &format!("## {}", t!("report.problems")));
    buffer.push('\n');
    let problems: Vec<&Finding> = report.problems().collect();
    if problems.is_empty() {
        push_line(&mut buffer, &t!("report.problems.none"));
    } else {
        push_row(
            &mut buffer,
            &[
                t!("report.column.control"),
                t!("report.column.resource"),
                t!("report.column.verdict"),
                t!("report.column.expected"),
                t!("report.column.observed"),
                t!("report.column.message"),
            ],
        );
        push_line(&mut buffer, "| --- | --- | --- | --- | --- | --- |");
        for finding in problems {
            push_row(
                &mut buffer,
                &[
                    finding.control.to_string(),
                    target(finding),
                    finding.verdict.as_str().to_string(),
                    format!("`{}`", compact(&finding.expected)),
                    format!("`{}`", compact(&finding.observed)),
                    finding.message.clone(),
                ],
            );
        }
    }
    buffer.push('\n');
    push_line(&mut buffer, &digest_line(report));
    buffer
}

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Renders an evaluation plan in the requested format.
///
/// # Errors
///
/// Returns [`RenderError`] when canonical JSON serialization fails.
pub fn render_plan(plan: &EvaluationPlan, format: OutputFormat) -> Result<String, RenderError> {
    if format == OutputFormat::Json {
        return canonical(plan);
    }
    let heading = if format == OutputFormat::Markdown { "### " } else { "" };
    let mut buffer = String::new();
    push_line(
        &mut buffer,
        &t!("plan.header", controls = plan.controls.len(), checks = plan.check_count()),
    );
    for control in &plan.controls {
        buffer.push('\n');
        push_line(
            &mut buffer,
            &format!(
                "{heading}{}",
                t!("plan.control", control = control.control, title = control.title)
            ),
        );
        for check in &control.checks {
            let line = match check {
                PlannedCheck::Resource(expected) => t!(
                    "plan.resource",
                    resource = expected.resource,
                    class = expected.class,
                    count = expected.count,
                    fields = expected.fields.len(),
                    collections = expected.collections.len()
                ),
                PlannedCheck::Precomputed(findings) => {
                    t!("plan.precomputed", findings = findings.len())
                }
            };
            push_line(&mut buffer, &line);
        }
    }
    Ok(buffer)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value as canonical JSON text.
fn canonical<T: serde::Serialize>(value: &T) -> Result<String, RenderError> {
    let bytes = canonical_json_bytes(value).map_err(|err| RenderError::Canonical(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| RenderError::Canonical(err.to_string()))
}

/// Formats overall verdict counts.
fn summary_line(summary: &ReportSummary) -> String {
    t!(
        "report.summary",
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        errored = summary.errored
    )
}

/// Formats the report digest.
fn digest_line(report: &Report) -> String {
    match &report.digest {
        Some(digest) => {
            t!("report.digest", algorithm = digest.algorithm.as_str(), value = digest.value)
        }
        None => t!("report.digest.unavailable"),
    }
}

/// Returns the resource label with the field path, when present.
fn target(finding: &Finding) -> String {
    match &finding.field {
        Some(field) => format!("{}/{field}", finding.resource),
        None => finding.resource.to_string(),
    }
}

/// Formats a JSON value on one line.
fn compact(value: &Value) -> String {
    value.to_string()
}

/// Escapes a Markdown table cell.
#[must_use]
pub fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\").replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Appends a Markdown table row.
fn push_row(buffer: &mut String, cells: &[String]) {
    let escaped: Vec<String> = cells.iter().map(|cell| escape_cell(cell)).collect();
    push_line(buffer, &format!("| {} |", escaped.join(" | ")));
}

/// Appends `line` and a newline.
fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}
