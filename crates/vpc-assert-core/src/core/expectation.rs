// crates/vpc-assert-core/src/core/expectation.rs
// ============================================================================
// Module: VPC Assert Expectations
// Description: Declarative expected-state records and field predicates.
// Purpose: Describe the desired shape of a resource independently of any provider.
// Dependencies: serde, serde_json, crate::core::{identifiers, resource}
// ============================================================================

//! ## Overview
//! An [`ExpectedState`] names a resource class, the filter used to find it,
//! how many matches must exist, and the field predicates every match must
//! satisfy. Fields that are not listed are not compared. An expected count
//! of zero means "must not exist" and carries no field checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::identifiers::ControlName;
use crate::core::identifiers::ResourceId;
use crate::core::resource::ResourceClass;
use crate::core::resource::ResourceFilter;

// ============================================================================
// SECTION: Field Expectations
// ============================================================================

/// Predicate applied to a single observed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldExpectation {
    /// Field equals the value. A missing field equals a zero value (`""`, `false`, `[]`).
    Equals(Value),
    /// Field includes the value: list membership, list subset, or object subset.
    Includes(Value),
    /// Field is missing, null, empty, or `false`.
    Absent,
    /// Field is present and non-empty.
    Present,
    /// Field is a string matching the regular expression.
    Matches(String),
    /// Field is a CIDR contained in the parent CIDR.
    InCidr(String),
    /// Field is a CIDR with the given prefix length.
    PrefixLength(u8),
    /// Field is a list with exactly this many elements.
    Length(usize),
    /// Every element of the list field is one of the values.
    EachIn(Vec<Value>),
}

impl FieldExpectation {
    /// Returns the stable label used in findings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::Includes(_) => "includes",
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Matches(_) => "matches",
            Self::InCidr(_) => "in_cidr",
            Self::PrefixLength(_) => "prefix_length",
            Self::Length(_) => "length",
            Self::EachIn(_) => "each_in",
        }
    }

    /// Returns the expected side rendered as JSON for findings.
    #[must_use]
    pub fn expected_value(&self) -> Value {
        match self {
            Self::Equals(value) | Self::Includes(value) => value.clone(),
            Self::Absent => Value::Null,
            Self::Present => json!("<present>"),
            Self::Matches(pattern) => json!({ "pattern": pattern }),
            Self::InCidr(parent) => json!({ "within": parent }),
            Self::PrefixLength(prefix) => json!({ "prefix_length": prefix }),
            Self::Length(length) => json!({ "length": length }),
            Self::EachIn(values) => json!({ "one_of": values }),
        }
    }
}

/// Named field paired with its predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    /// Dotted field path.
    pub field: String,
    /// Predicate applied to the field.
    pub expectation: FieldExpectation,
}

impl FieldCheck {
    /// Creates a field check.
    #[must_use]
    pub fn new(field: impl Into<String>, expectation: FieldExpectation) -> Self {
        Self {
            field: field.into(),
            expectation,
        }
    }

    /// Field must equal the value.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FieldExpectation::Equals(value.into()))
    }

    /// Field must include the value.
    #[must_use]
    pub fn includes(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FieldExpectation::Includes(value.into()))
    }

    /// Field must be absent.
    #[must_use]
    pub fn absent(field: impl Into<String>) -> Self {
        Self::new(field, FieldExpectation::Absent)
    }

    /// Field must be present.
    #[must_use]
    pub fn present(field: impl Into<String>) -> Self {
        Self::new(field, FieldExpectation::Present)
    }

    /// Field must match the pattern.
    #[must_use]
    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FieldExpectation::Matches(pattern.into()))
    }
}

// ============================================================================
// SECTION: Collection Checks
// ============================================================================

/// Checks applied to the elements of a list-valued field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionCheck {
    /// Dotted path of the list field.
    pub field: String,
    /// Element field used to address elements in `by_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
    /// Checks applied to every element.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub each: Vec<FieldCheck>,
    /// Checks applied to the element whose `key_field` equals the map key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_key: BTreeMap<String, Vec<FieldCheck>>,
}

impl CollectionCheck {
    /// Creates a collection check over `field`.
    #[must_use]
    pub fn over(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    /// Sets the element key field.
    #[must_use]
    pub fn keyed_by(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    /// Adds a check applied to every element.
    #[must_use]
    pub fn each(mut self, check: FieldCheck) -> Self {
        self.each.push(check);
        self
    }

    /// Adds a check applied to the element with the given key.
    #[must_use]
    pub fn for_key(mut self, key: impl Into<String>, check: FieldCheck) -> Self {
        self.by_key.entry(key.into()).or_default().push(check);
        self
    }
}

// ============================================================================
// SECTION: Expected State
// ============================================================================

/// Expected state of one resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedState {
    /// Control that owns the expectation.
    pub control: ControlName,
    /// Label of the resource instance.
    pub resource: ResourceId,
    /// Resource class to query.
    pub class: ResourceClass,
    /// Provider filter selecting candidate resources.
    pub filter: ResourceFilter,
    /// Number of matching resources that must exist.
    pub count: usize,
    /// Field checks applied to each match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldCheck>,
    /// Element checks applied to list fields of each match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionCheck>,
}

impl ExpectedState {
    /// Creates an expectation for exactly one matching resource.
    #[must_use]
    pub fn new(
        control: ControlName,
        resource: impl Into<ResourceId>,
        class: ResourceClass,
        filter: ResourceFilter,
    ) -> Self {
        Self {
            control,
            resource: resource.into(),
            class,
            filter,
            count: 1,
            fields: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Sets the expected count; a zero count drops all field and collection checks.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        if count == 0 {
            self.fields.clear();
            self.collections.clear();
        }
        self
    }

    /// Adds a field check when the resource is expected to exist.
    #[must_use]
    pub fn expect(mut self, check: FieldCheck) -> Self {
        if self.count > 0 {
            self.fields.push(check);
        }
        self
    }

    /// Adds a collection check when the resource is expected to exist.
    #[must_use]
    pub fn expect_collection(mut self, check: CollectionCheck) -> Self {
        if self.count > 0 {
            self.collections.push(check);
        }
        self
    }

    /// Returns true when the resource must not exist.
    #[must_use]
    pub const fn expects_absence(&self) -> bool {
        self.count == 0
    }
}
