// crates/vpc-assert-core/src/core/resource.rs
// ============================================================================
// Module: VPC Assert Resource Model
// Description: Resource classes, coordinates, provider filters, and observed records.
// Purpose: Describe what to fetch from a provider and what came back.
// Dependencies: serde, serde_json, regex
// ============================================================================

//! ## Overview
//! A [`ResourceFilter`] is the query handed to a provider; an
//! [`ObservedResource`] is one structured record returned by it. Filters are
//! also applied locally so providers that cannot filter server-side (or only
//! partially) still yield exactly the matching set.
//!
//! Link-valued fields (`network`, `region`, `router`) compare by their
//! `projects/...` tail or by their final path segment, so full URLs and
//! partial self-links match each other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Resource Class
// ============================================================================

/// Cloud networking resource classes understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Virtual network (global).
    Network,
    /// Regional subnetwork.
    Subnetwork,
    /// Regional cloud router.
    Router,
    /// NAT gateway attached to a router.
    NatGateway,
    /// Global route.
    Route,
    /// Global address (used by private service connect).
    GlobalAddress,
    /// Global forwarding rule.
    ForwardingRule,
}

impl ResourceClass {
    /// Every resource class, in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Network,
        Self::Subnetwork,
        Self::Router,
        Self::NatGateway,
        Self::Route,
        Self::GlobalAddress,
        Self::ForwardingRule,
    ];

    /// Returns the stable snake-case label for the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Subnetwork => "subnetwork",
            Self::Router => "router",
            Self::NatGateway => "nat_gateway",
            Self::Route => "route",
            Self::GlobalAddress => "global_address",
            Self::ForwardingRule => "forwarding_rule",
        }
    }

    /// Returns true when resources of this class live in a region.
    #[must_use]
    pub const fn is_regional(self) -> bool {
        matches!(self, Self::Subnetwork | Self::Router | Self::NatGateway)
    }

    /// Returns the self-link collection segment for the class.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Network => "networks",
            Self::Subnetwork => "subnetworks",
            Self::Router => "routers",
            Self::NatGateway => "nats",
            Self::Route => "routes",
            Self::GlobalAddress => "addresses",
            Self::ForwardingRule => "forwardingRules",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Coordinates
// ============================================================================

/// Structured location of a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCoordinates {
    /// Owning project identifier.
    pub project: String,
    /// Region for regional resources; `None` for global ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Resource name.
    pub name: String,
}

impl ResourceCoordinates {
    /// Creates coordinates for a global resource.
    #[must_use]
    pub fn global(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: None,
            name: name.into(),
        }
    }

    /// Creates coordinates for a regional resource.
    #[must_use]
    pub fn regional(
        project: impl Into<String>,
        region: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            region: Some(region.into()),
            name: name.into(),
        }
    }

    /// Returns true when the region presence agrees with the class.
    #[must_use]
    pub const fn fits(&self, class: ResourceClass) -> bool {
        self.region.is_some() == class.is_regional()
    }
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Name constraint inside a [`ResourceFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NameFilter {
    /// Name must equal the value.
    Exact(String),
    /// Name must match the regular expression. Invalid patterns match nothing.
    Pattern(String),
}

impl NameFilter {
    /// Returns true when `name` satisfies the constraint.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == name,
            Self::Pattern(pattern) => {
                Regex::new(pattern).map(|regex| regex.is_match(name)).unwrap_or(false)
            }
        }
    }

    /// Returns the exact name when the filter is not a pattern.
    #[must_use]
    pub fn exact(&self) -> Option<&str> {
        match self {
            Self::Exact(name) => Some(name),
            Self::Pattern(_) => None,
        }
    }
}

/// Query handed to a resource provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    /// Project to search.
    pub project: String,
    /// Region constraint for regional classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Network self-link (or name) the resource must belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Router name the resource must be attached to (NAT gateways).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    /// Name constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameFilter>,
    /// Exact-value constraints on additional fields (dotted paths).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl ResourceFilter {
    /// Creates a filter scoped to a project.
    #[must_use]
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: None,
            network: None,
            router: None,
            name: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a filter selecting exactly the resource at `coordinates`.
    #[must_use]
    pub fn at(coordinates: &ResourceCoordinates) -> Self {
        Self {
            region: coordinates.region.clone(),
            name: Some(NameFilter::Exact(coordinates.name.clone())),
            ..Self::project(coordinates.project.clone())
        }
    }

    /// Restricts the filter to a region.
    #[must_use]
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Restricts the filter to a network.
    #[must_use]
    pub fn on_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Restricts the filter to a router.
    #[must_use]
    pub fn on_router(mut self, router: impl Into<String>) -> Self {
        self.router = Some(router.into());
        self
    }

    /// Restricts the filter to an exact name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameFilter::Exact(name.into()));
        self
    }

    /// Restricts the filter to names matching a regular expression.
    #[must_use]
    pub fn name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name = Some(NameFilter::Pattern(pattern.into()));
        self
    }

    /// Adds an exact-value constraint on a field.
    #[must_use]
    pub fn with_attribute(mut self, field: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(field.into(), value);
        self
    }

    /// Returns true when the observed record satisfies every constraint.
    #[must_use]
    pub fn matches(&self, resource: &ObservedResource) -> bool {
        if let Some(project) = resource.project()
            && project != self.project
        {
            return false;
        }
        if let Some(region) = &self.region
            && !link_field_matches(resource.field("region"), region)
        {
            return false;
        }
        if let Some(network) = &self.network
            && !link_field_matches(resource.field("network"), network)
        {
            return false;
        }
        if let Some(router) = &self.router
            && !link_field_matches(resource.field("router"), router)
        {
            return false;
        }
        if let Some(name) = &self.name {
            let Some(observed) = resource.name() else {
                return false;
            };
            if !name.matches(observed) {
                return false;
            }
        }
        self.attributes.iter().all(|(field, expected)| {
            resource.field(field).is_some_and(|observed| values_equal(expected, observed))
        })
    }
}

// ============================================================================
// SECTION: Observed Resources
// ============================================================================

/// Structured resource record returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedResource {
    /// Class of the resource.
    pub class: ResourceClass,
    /// Snake-case field map as returned by the provider.
    pub fields: Map<String, Value>,
}

impl ObservedResource {
    /// Creates an observed record from a field map.
    #[must_use]
    pub const fn new(class: ResourceClass, fields: Map<String, Value>) -> Self {
        Self {
            class,
            fields,
        }
    }

    /// Creates an observed record from a JSON object; other values yield `None`.
    #[must_use]
    pub fn from_value(class: ResourceClass, value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(class, fields)),
            _ => None,
        }
    }

    /// Resolves a dotted field path (`log_config.enable`).
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup_field(&self.fields, path)
    }

    /// Returns the resource name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Returns the owning project from the `project` field or the self-link.
    #[must_use]
    pub fn project(&self) -> Option<String> {
        if let Some(project) = self.fields.get("project").and_then(Value::as_str) {
            return Some(last_segment(project).to_string());
        }
        let link = self.fields.get("self_link").and_then(Value::as_str)?;
        let tail = link.split_once("projects/")?.1;
        tail.split('/').next().map(ToString::to_string)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a dotted path inside a JSON object.
#[must_use]
pub fn lookup_field<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = fields.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Compares JSON values, treating integers and floats with equal value as equal.
#[must_use]
pub fn values_equal(expected: &Value, observed: &Value) -> bool {
    match (expected, observed) {
        (Value::Number(left), Value::Number(right)) => {
            if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
                return left == right;
            }
            if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
                return left == right;
            }
            match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => (left - right).abs() < f64::EPSILON,
                _ => false,
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(left, right)| values_equal(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| values_equal(value, other)))
        }
        _ => expected == observed,
    }
}

/// Returns true when two resource links refer to the same resource.
#[must_use]
pub fn same_link(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    match (link_tail(left), link_tail(right)) {
        (Some(left), Some(right)) => left == right,
        _ => last_segment(left) == last_segment(right),
    }
}

/// Returns the `projects/...` tail of a link.
fn link_tail(link: &str) -> Option<&str> {
    link.find("projects/").map(|index| &link[index..])
}

/// Returns the final path segment of a link.
fn last_segment(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Matches an optional link-valued field against a filter value.
fn link_field_matches(observed: Option<&Value>, expected: &str) -> bool {
    observed.and_then(Value::as_str).is_some_and(|observed| same_link(observed, expected))
}
