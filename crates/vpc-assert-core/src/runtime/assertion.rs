// crates/vpc-assert-core/src/runtime/assertion.rs
// ============================================================================
// Module: VPC Assert Assertion Engine
// Description: Field-by-field comparison of expected and observed state.
// Purpose: Convert an expectation plus observed records into ordered findings.
// Dependencies: ipnet, regex, serde_json, thiserror, crate::core
// ============================================================================

//! ## Overview
//! [`evaluate`] is a pure comparator: it never calls a provider. It always
//! emits one count finding, then (when the resource should exist) one finding
//! per field check and per collection element check for each observed
//! record, in declaration order. Records are visited in name order so
//! reports are reproducible.
//!
//! Missing fields compare equal to zero values (`""`, `false`, `null`, empty
//! list or object); providers routinely omit them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ipnet::IpNet;
use regex::Regex;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::expectation::CollectionCheck;
use crate::core::expectation::ExpectedState;
use crate::core::expectation::FieldCheck;
use crate::core::expectation::FieldExpectation;
use crate::core::finding::Finding;
use crate::core::finding::FindingKind;
use crate::core::finding::Verdict;
use crate::core::identifiers::ResourceId;
use crate::core::resource::ObservedResource;
use crate::core::resource::lookup_field;
use crate::core::resource::same_link;
use crate::core::resource::values_equal;

// ============================================================================
// SECTION: CIDR Predicates
// ============================================================================

/// Errors raised by CIDR predicates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    /// Value is not a CIDR block.
    #[error("invalid cidr: {0}")]
    Invalid(String),
}

/// Parses a CIDR block.
fn parse_cidr(value: &str) -> Result<IpNet, CidrError> {
    value.trim().parse::<IpNet>().map_err(|_| CidrError::Invalid(value.to_string()))
}

/// Returns true when every address of `candidate` lies inside `parent`.
///
/// # Errors
///
/// Returns [`CidrError`] when either value is not a CIDR block.
pub fn be_in_cidr(candidate: &str, parent: &str) -> Result<bool, CidrError> {
    let candidate = parse_cidr(candidate)?;
    let parent = parse_cidr(parent)?;
    Ok(parent.contains(&candidate))
}

/// Returns true when `candidate` has the given prefix length.
///
/// # Errors
///
/// Returns [`CidrError`] when the value is not a CIDR block.
pub fn has_prefix_length(candidate: &str, prefix: u8) -> Result<bool, CidrError> {
    Ok(parse_cidr(candidate)?.prefix_len() == prefix)
}

// ============================================================================
// SECTION: Field Outcomes
// ============================================================================

/// Result of applying one predicate to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutcome {
    /// True when the predicate held.
    pub passed: bool,
    /// Observed value (null when missing).
    pub observed: Value,
    /// Extra detail for failures that are not plain mismatches.
    pub detail: Option<String>,
}

impl FieldOutcome {
    /// Creates an outcome without extra detail.
    fn plain(passed: bool, observed: Value) -> Self {
        Self {
            passed,
            observed,
            detail: None,
        }
    }

    /// Creates a failing outcome with detail.
    fn failed(observed: Value, detail: String) -> Self {
        Self {
            passed: false,
            observed,
            detail: Some(detail),
        }
    }
}

/// Applies a predicate to an optional observed value.
#[must_use]
pub fn check_value(expectation: &FieldExpectation, observed: Option<&Value>) -> FieldOutcome {
    let value = observed.cloned().unwrap_or(Value::Null);
    match expectation {
        FieldExpectation::Equals(expected) => {
            let passed = if is_zero(&value) && is_zero(expected) {
                true
            } else {
                values_equal(expected, &value)
            };
            FieldOutcome::plain(passed, value)
        }
        FieldExpectation::Includes(expected) => {
            let passed = includes(&value, expected);
            FieldOutcome::plain(passed, value)
        }
        FieldExpectation::Absent => FieldOutcome::plain(is_zero(&value), value),
        FieldExpectation::Present => FieldOutcome::plain(!is_zero(&value), value),
        FieldExpectation::Matches(pattern) => match Regex::new(pattern) {
            Ok(regex) => {
                let passed = value.as_str().is_some_and(|text| regex.is_match(text));
                FieldOutcome::plain(passed, value)
            }
            Err(err) => FieldOutcome::failed(value, format!("invalid pattern: {err}")),
        },
        FieldExpectation::InCidr(parent) => {
            let Some(candidate) = value.as_str() else {
                return FieldOutcome::failed(value, "value is not a cidr string".to_string());
            };
            match be_in_cidr(candidate, parent) {
                Ok(passed) => FieldOutcome::plain(passed, value),
                Err(err) => FieldOutcome::failed(value, err.to_string()),
            }
        }
        FieldExpectation::PrefixLength(prefix) => {
            let Some(candidate) = value.as_str() else {
                return FieldOutcome::failed(value, "value is not a cidr string".to_string());
            };
            match has_prefix_length(candidate, *prefix) {
                Ok(passed) => FieldOutcome::plain(passed, value),
                Err(err) => FieldOutcome::failed(value, err.to_string()),
            }
        }
        FieldExpectation::Length(length) => {
            let observed_len = match &value {
                Value::Array(items) => Some(items.len()),
                Value::Null => Some(0),
                _ => None,
            };
            match observed_len {
                Some(observed_len) => FieldOutcome::plain(observed_len == *length, value),
                None => FieldOutcome::failed(value, "value is not a list".to_string()),
            }
        }
        FieldExpectation::EachIn(allowed) => {
            let passed = match &value {
                Value::Array(items) => items.iter().all(|item| member_of(item, allowed)),
                Value::Null => true,
                other => member_of(other, allowed),
            };
            FieldOutcome::plain(passed, value)
        }
    }
}

/// Returns true for null, empty, and `false` values.
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Implements list membership, list subset, and object subset.
fn includes(observed: &Value, expected: &Value) -> bool {
    match (observed, expected) {
        (Value::Array(items), Value::Array(wanted)) => {
            wanted.iter().all(|want| items.iter().any(|item| values_equal(want, item)))
        }
        (Value::Object(map), Value::Object(wanted)) => wanted
            .iter()
            .all(|(key, want)| map.get(key).is_some_and(|have| values_equal(want, have))),
        (Value::Array(items), scalar) => items.iter().any(|item| values_equal(scalar, item)),
        (Value::Null, Value::Array(wanted)) => wanted.is_empty(),
        (Value::Null, Value::Object(wanted)) => wanted.is_empty(),
        (observed, scalar) => values_equal(scalar, observed),
    }
}

/// Returns true when the value equals one of the allowed values.
fn member_of(value: &Value, allowed: &[Value]) -> bool {
    allowed.iter().any(|candidate| match (candidate, value) {
        (Value::String(left), Value::String(right)) => same_link(left, right),
        _ => values_equal(candidate, value),
    })
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Compares an expectation against the observed records that matched its filter.
#[must_use]
pub fn evaluate(expected: &ExpectedState, observed: &[ObservedResource]) -> Vec<Finding> {
    let mut findings = Vec::with_capacity(1 + expected.fields.len());
    findings.push(count_finding(expected, observed.len()));
    if expected.expects_absence() {
        return findings;
    }

    let mut ordered: Vec<&ObservedResource> = observed.iter().collect();
    ordered.sort_by(|left, right| left.name().cmp(&right.name()));
    let label_each = ordered.len() > 1;
    for resource in ordered {
        let resource_id = if label_each {
            ResourceId::new(format!(
                "{}#{}",
                expected.resource,
                resource.name().unwrap_or("<unnamed>")
            ))
        } else {
            expected.resource.clone()
        };
        for check in &expected.fields {
            let outcome = check_value(&check.expectation, resource.field(&check.field));
            findings.push(field_finding(expected, &resource_id, &check.field, check, outcome));
        }
        for collection in &expected.collections {
            evaluate_collection(expected, &resource_id, collection, resource, &mut findings);
        }
    }
    findings
}

/// Builds the count finding for an expectation.
fn count_finding(expected: &ExpectedState, observed: usize) -> Finding {
    let passed = observed == expected.count;
    let message = if expected.count == 0 {
        format!("{} should not exist (found {observed})", expected.class)
    } else {
        format!("{} should exist (expected {}, found {observed})", expected.class, expected.count)
    };
    Finding::new(&expected.control, &expected.resource, FindingKind::Count)
        .with_values(json!(expected.count), json!(observed))
        .with_verdict(Verdict::from_bool(passed))
        .with_message(message)
}

/// Builds a field finding from an outcome.
fn field_finding(
    expected: &ExpectedState,
    resource: &ResourceId,
    path: &str,
    check: &FieldCheck,
    outcome: FieldOutcome,
) -> Finding {
    let expected_value = check.expectation.expected_value();
    let label = check.expectation.label();
    let message = if outcome.passed {
        format!("{path}: {label} satisfied")
    } else if let Some(detail) = &outcome.detail {
        format!("{path}: {label} {expected_value} failed: {detail}")
    } else {
        format!("{path}: expected {label} {expected_value}, observed {}", outcome.observed)
    };
    Finding::new(&expected.control, resource, FindingKind::Field)
        .on_field(path)
        .with_values(expected_value, outcome.observed)
        .with_verdict(Verdict::from_bool(outcome.passed))
        .with_message(message)
}

/// Evaluates a collection check against one observed record.
fn evaluate_collection(
    expected: &ExpectedState,
    resource_id: &ResourceId,
    collection: &CollectionCheck,
    resource: &ObservedResource,
    findings: &mut Vec<Finding>,
) {
    let empty = Vec::new();
    let elements = resource.field(&collection.field).and_then(Value::as_array).unwrap_or(&empty);
    let key_field = collection.key_field.as_deref().unwrap_or("name");

    for (index, element) in elements.iter().enumerate() {
        let fields = element.as_object();
        for check in &collection.each {
            let path = format!("{}[{index}].{}", collection.field, check.field);
            let observed = fields.and_then(|fields| lookup_field(fields, &check.field));
            let outcome = check_value(&check.expectation, observed);
            findings.push(field_finding(expected, resource_id, &path, check, outcome));
        }
    }

    for (key, checks) in &collection.by_key {
        let element = find_keyed(elements, key_field, key);
        for check in checks {
            let path = format!("{}[{key}].{}", collection.field, check.field);
            let outcome = match element {
                Some(fields) => check_value(&check.expectation, lookup_field(fields, &check.field)),
                None => FieldOutcome::failed(
                    Value::Null,
                    format!("no element with {key_field}={key}"),
                ),
            };
            findings.push(field_finding(expected, resource_id, &path, check, outcome));
        }
    }
}

/// Finds the element whose key field equals `key`.
fn find_keyed<'a>(elements: &'a [Value], key_field: &str, key: &str) -> Option<&'a Map<String, Value>> {
    elements.iter().filter_map(Value::as_object).find(|fields| {
        lookup_field(fields, key_field).and_then(Value::as_str) == Some(key)
    })
}
