// crates/vpc-assert-core/src/runtime/locator.rs
// ============================================================================
// Module: VPC Assert Resource Locator
// Description: Self-link parsing, rendering, and single-resource fetches.
// Purpose: Turn fully-qualified identifiers into coordinates and back.
// Dependencies: regex, serde_json, thiserror, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Self-links come in two shapes:
//! `projects/{project}/global/{collection}/{name}` and
//! `projects/{project}/regions/{region}/{collection}/{name}`, optionally
//! prefixed by an API base URL. Project, region, and name segments follow the
//! provider's identifier syntax: a lowercase letter first, lowercase
//! alphanumerics and hyphens after, no trailing hyphen, bounded length.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::finding::Finding;
use crate::core::finding::FindingKind;
use crate::core::finding::Verdict;
use crate::core::identifiers::ControlName;
use crate::core::identifiers::ResourceId;
use crate::core::resource::ObservedResource;
use crate::core::resource::ResourceClass;
use crate::core::resource::ResourceCoordinates;
use crate::core::resource::ResourceFilter;
use crate::interfaces::ProviderError;
use crate::interfaces::ResourceProvider;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base URL prepended to canonical self-links.
pub const COMPUTE_API_PREFIX: &str = "https://www.googleapis.com/compute/v1/";

/// Project identifier syntax.
const PROJECT_SYNTAX: &str = "[a-z][a-z0-9-]{4,28}[a-z0-9]";
/// Region identifier syntax.
const REGION_SYNTAX: &str = "[a-z]{2,}-[a-z]{2,}[0-9]";
/// Resource name syntax.
const NAME_SYNTAX: &str = "[a-z](?:[a-z0-9-]{0,61}[a-z0-9])?";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing self-links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// Self-link was empty or missing.
    #[error("missing self-link for {0}")]
    Missing(ResourceClass),
    /// Self-link does not have the shape expected for the class.
    #[error("self-link for {class} does not match the expected shape: {link}")]
    Mismatch {
        /// Expected resource class.
        class: ResourceClass,
        /// Offending self-link.
        link: String,
    },
    /// Built-in pattern failed to compile.
    #[error("self-link pattern unavailable: {0}")]
    Pattern(String),
}

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Self-link shape selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfLinkPattern {
    /// `projects/{project}/global/{collection}/{name}`.
    Global(ResourceClass),
    /// `projects/{project}/regions/{region}/{collection}/{name}`.
    Regional(ResourceClass),
}

impl SelfLinkPattern {
    /// Pattern for network self-links.
    pub const NETWORK: Self = Self::Global(ResourceClass::Network);
    /// Pattern for subnetwork self-links.
    pub const SUBNETWORK: Self = Self::Regional(ResourceClass::Subnetwork);

    /// Returns the pattern matching the class's scope.
    #[must_use]
    pub const fn for_class(class: ResourceClass) -> Self {
        if class.is_regional() { Self::Regional(class) } else { Self::Global(class) }
    }

    /// Returns the resource class the pattern parses.
    #[must_use]
    pub const fn class(self) -> ResourceClass {
        match self {
            Self::Global(class) | Self::Regional(class) => class,
        }
    }

    /// Returns a human-readable description of the expected shape.
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Global(class) => {
                format!("projects/{PROJECT_SYNTAX}/global/{}/{NAME_SYNTAX}", class.collection())
            }
            Self::Regional(class) => format!(
                "projects/{PROJECT_SYNTAX}/regions/{REGION_SYNTAX}/{}/{NAME_SYNTAX}",
                class.collection()
            ),
        }
    }
}

/// Returns the compiled global self-link regex.
fn global_regex() -> Result<&'static Regex, LocatorError> {
    static GLOBAL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    GLOBAL
        .get_or_init(|| {
            Regex::new(&format!(
                "(?:^|/)projects/(?P<project>{PROJECT_SYNTAX})/global/(?P<collection>[A-Za-z]+)/(?P<name>{NAME_SYNTAX})$"
            ))
        })
        .as_ref()
        .map_err(|err| LocatorError::Pattern(err.to_string()))
}

/// Returns the compiled regional self-link regex.
fn regional_regex() -> Result<&'static Regex, LocatorError> {
    static REGIONAL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    REGIONAL
        .get_or_init(|| {
            Regex::new(&format!(
                "(?:^|/)projects/(?P<project>{PROJECT_SYNTAX})/regions/(?P<region>{REGION_SYNTAX})/(?P<collection>[A-Za-z]+)/(?P<name>{NAME_SYNTAX})$"
            ))
        })
        .as_ref()
        .map_err(|err| LocatorError::Pattern(err.to_string()))
}

/// Returns the compiled bare resource-name regex.
fn name_regex() -> Result<&'static Regex, LocatorError> {
    static NAME: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(&format!("^{NAME_SYNTAX}$")))
        .as_ref()
        .map_err(|err| LocatorError::Pattern(err.to_string()))
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a self-link into coordinates for the pattern's class.
///
/// # Errors
///
/// Returns [`LocatorError`] when the link is empty or has the wrong shape.
pub fn parse_self_link(
    pattern: SelfLinkPattern,
    self_link: &str,
) -> Result<ResourceCoordinates, LocatorError> {
    let class = pattern.class();
    let link = self_link.trim();
    if link.is_empty() {
        return Err(LocatorError::Missing(class));
    }
    let mismatch = || LocatorError::Mismatch {
        class,
        link: link.to_string(),
    };
    let regex = match pattern {
        SelfLinkPattern::Global(_) => global_regex()?,
        SelfLinkPattern::Regional(_) => regional_regex()?,
    };
    let captures = regex.captures(link).ok_or_else(mismatch)?;
    if captures.name("collection").map(|m| m.as_str()) != Some(class.collection()) {
        return Err(mismatch());
    }
    let project = captures.name("project").ok_or_else(mismatch)?.as_str();
    let name = captures.name("name").ok_or_else(mismatch)?.as_str();
    match pattern {
        SelfLinkPattern::Global(_) => Ok(ResourceCoordinates::global(project, name)),
        SelfLinkPattern::Regional(_) => {
            let region = captures.name("region").ok_or_else(mismatch)?.as_str();
            Ok(ResourceCoordinates::regional(project, region, name))
        }
    }
}

/// Returns true when `name` is a syntactically valid resource name.
#[must_use]
pub fn is_valid_resource_name(name: &str) -> bool {
    name_regex().is_ok_and(|regex| regex.is_match(name))
}

/// Renders the canonical relative self-link for coordinates.
#[must_use]
pub fn self_link_for(class: ResourceClass, coordinates: &ResourceCoordinates) -> String {
    match &coordinates.region {
        Some(region) => format!(
            "projects/{}/regions/{region}/{}/{}",
            coordinates.project,
            class.collection(),
            coordinates.name
        ),
        None => format!(
            "projects/{}/global/{}/{}",
            coordinates.project,
            class.collection(),
            coordinates.name
        ),
    }
}

/// Renders the canonical self-link URL for coordinates.
#[must_use]
pub fn self_link_url(class: ResourceClass, coordinates: &ResourceCoordinates) -> String {
    format!("{COMPUTE_API_PREFIX}{}", self_link_for(class, coordinates))
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Checks a self-link's shape and records the outcome as a structural finding.
///
/// Returns the finding and, when the link parsed, its coordinates.
#[must_use]
pub fn check_self_link(
    control: &ControlName,
    resource: &ResourceId,
    field: &str,
    pattern: SelfLinkPattern,
    self_link: Option<&str>,
) -> (Finding, Option<ResourceCoordinates>) {
    let base = Finding::new(control, resource, FindingKind::Structural)
        .on_field(field)
        .with_values(
            json!({ "pattern": pattern.describe() }),
            self_link.map_or(Value::Null, |link| Value::String(link.to_string())),
        );
    match parse_self_link(pattern, self_link.unwrap_or_default()) {
        Ok(coordinates) => (
            base.with_message(format!("{field} is a well-formed {} self-link", pattern.class())),
            Some(coordinates),
        ),
        Err(err) => (base.with_verdict(Verdict::Error).with_message(err.to_string()), None),
    }
}

// ============================================================================
// SECTION: Fetch
// ============================================================================

/// Fetches the single resource at `coordinates`; zero matches is `Ok(None)`.
///
/// Library entry point for callers that hold a self-link and want the
/// resource behind it. Pair it with [`parse_self_link`] to resolve a link
/// into coordinates first. The engine does not call it; planned checks go
/// through filtered queries so count expectations see every match. The query
/// is made once, with no retry or timeout.
///
/// # Errors
///
/// Returns [`ProviderError`] when the provider query fails.
pub fn fetch<P: ResourceProvider + ?Sized>(
    provider: &P,
    class: ResourceClass,
    coordinates: &ResourceCoordinates,
) -> Result<Option<ObservedResource>, ProviderError> {
    let filter = ResourceFilter::at(coordinates);
    let found = provider.query(class, &filter)?;
    Ok(found.into_iter().find(|resource| filter.matches(resource)))
}
