// crates/vpc-assert-core/src/runtime/cross_check.rs
// ============================================================================
// Module: VPC Assert Cross-Consistency Checker
// Description: Field-for-field agreement between two keyed representations.
// Purpose: Detect drift between outputs that describe the same entities.
// Dependencies: serde_json, crate::core
// ============================================================================

//! ## Overview
//! Two maps describe the same entities under different keys (for example
//! subnets keyed by name and subnets keyed by region). A key-mapping function
//! pairs each entry of the first map with its counterpart in the second. The
//! keying fields are removed with [`without_fields`] and every remaining field
//! in either entry must match. Missing counterparts and unreferenced entries
//! are findings, never errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::finding::Finding;
use crate::core::finding::FindingKind;
use crate::core::finding::Verdict;
use crate::core::identifiers::ControlName;
use crate::core::identifiers::ResourceId;
use crate::core::resource::values_equal;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One keyed representation of a set of entities.
#[derive(Debug, Clone, Copy)]
pub struct KeyedView<'a> {
    /// Label used in resource identifiers and messages.
    pub label: &'a str,
    /// Entries keyed by this representation's key.
    pub entries: &'a BTreeMap<String, Value>,
    /// Field inside each entry that carries the other representation's key.
    pub key_field: Option<&'a str>,
}

impl<'a> KeyedView<'a> {
    /// Creates a keyed view.
    #[must_use]
    pub const fn new(
        label: &'a str,
        entries: &'a BTreeMap<String, Value>,
        key_field: Option<&'a str>,
    ) -> Self {
        Self {
            label,
            entries,
            key_field,
        }
    }

    /// Returns the entry fields minus this view's key field.
    fn comparable(&self, entry: &Value) -> Map<String, Value> {
        match self.key_field {
            Some(field) => without_fields(entry, &[field]),
            None => without_fields(entry, &[]),
        }
    }
}

// ============================================================================
// SECTION: Field-Set Difference
// ============================================================================

/// Returns the object's fields minus `excluded`; non-objects yield an empty map.
#[must_use]
pub fn without_fields(value: &Value, excluded: &[&str]) -> Map<String, Value> {
    let Value::Object(map) = value else {
        return Map::new();
    };
    map.iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

// ============================================================================
// SECTION: Cross Check
// ============================================================================

/// Checks that every entry of `a` agrees with its counterpart in `b`.
///
/// `key_map` returns the `b` key for an `a` entry, or `None` when it cannot
/// be derived.
#[must_use]
pub fn cross_check<F>(
    control: &ControlName,
    a: &KeyedView<'_>,
    b: &KeyedView<'_>,
    key_map: F,
) -> Vec<Finding>
where
    F: Fn(&str, &Value) -> Option<String>,
{
    let mut findings = Vec::new();
    let mut referenced = BTreeSet::new();

    for (a_key, a_entry) in a.entries {
        let resource = ResourceId::new(format!("{}[{a_key}]", a.label));
        let b_key = key_map(a_key, a_entry);
        let counterpart =
            b_key.as_ref().and_then(|key| b.entries.get(key).map(|entry| (key, entry)));
        let Some((b_key, b_entry)) = counterpart else {
            findings.push(
                Finding::new(control, &resource, FindingKind::Consistency)
                    .with_values(json!(b_key), Value::Null)
                    .with_verdict(Verdict::Fail)
                    .with_message(format!("{}[{a_key}] has no counterpart in {}", a.label, b.label)),
            );
            continue;
        };
        referenced.insert(b_key.clone());

        if let Some(echo_field) = b.key_field {
            let observed = b_entry.get(echo_field).cloned().unwrap_or(Value::Null);
            let passed = observed.as_str() == Some(a_key.as_str());
            findings.push(
                Finding::new(control, &resource, FindingKind::Consistency)
                    .on_field(format!("{}[{b_key}].{echo_field}", b.label))
                    .with_values(json!(a_key), observed)
                    .with_verdict(Verdict::from_bool(passed))
                    .with_message(format!(
                        "{}[{b_key}].{echo_field} should equal {} key {a_key}",
                        b.label, a.label
                    )),
            );
        }

        let a_fields = a.comparable(a_entry);
        let b_fields = b.comparable(b_entry);
        let names: BTreeSet<&String> = a_fields.keys().chain(b_fields.keys()).collect();
        for name in names {
            let left = a_fields.get(name);
            let right = b_fields.get(name);
            let passed = matches!((left, right), (Some(left), Some(right)) if values_equal(left, right));
            let message = match (left, right) {
                (Some(_), None) => format!("{name} missing from {}[{b_key}]", b.label),
                (None, Some(_)) => format!("{name} missing from {}[{a_key}]", a.label),
                _ if passed => format!("{name} agrees between {} and {}", a.label, b.label),
                _ => format!("{name} differs between {} and {}", a.label, b.label),
            };
            findings.push(
                Finding::new(control, &resource, FindingKind::Consistency)
                    .on_field(name.clone())
                    .with_values(
                        left.cloned().unwrap_or(Value::Null),
                        right.cloned().unwrap_or(Value::Null),
                    )
                    .with_verdict(Verdict::from_bool(passed))
                    .with_message(message),
            );
        }
    }

    for b_key in b.entries.keys().filter(|key| !referenced.contains(*key)) {
        findings.push(
            Finding::new(
                control,
                &ResourceId::new(format!("{}[{b_key}]", b.label)),
                FindingKind::Consistency,
            )
            .with_values(Value::Null, json!(b_key))
            .with_verdict(Verdict::Fail)
            .with_message(format!("{}[{b_key}] has no counterpart in {}", b.label, a.label)),
        );
    }
    findings
}
