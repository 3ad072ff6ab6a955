// crates/vpc-assert-controls/src/naming.rs
// ============================================================================
// Module: Resource Naming
// Description: Deterministic names the provisioning module gives resources.
// Purpose: Derive expected resource names from the network name and region.
// Dependencies: regex, vpc-assert-core
// ============================================================================

//! ## Overview
//! Regional resources are named `{name}-{abbrev}` where the abbreviation
//! keeps the first two letters of the first two region words plus the
//! trailing zone digit: `us-west1` becomes `us-we1`. Routers and NAT
//! gateways reuse the subnet name. The PSC forwarding rule name keeps only
//! `[a-z0-9]` characters of the network name, truncated to 20.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use vpc_assert_core::runtime::is_valid_resource_name;

use crate::error::BuilderError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a PSC forwarding rule name.
pub const FORWARDING_RULE_NAME_LEN: usize = 20;
/// Destination range of the restricted Google APIs VIP.
pub const RESTRICTED_APIS_CIDR: &str = "199.36.153.4/30";
/// Destination range of the private Google APIs VIP.
pub const PRIVATE_APIS_CIDR: &str = "199.36.153.8/30";
/// Destination of default and NAT routes.
pub const DEFAULT_ROUTE_CIDR: &str = "0.0.0.0/0";
/// Destination of the IPv6 default route created for dual-stack subnets.
pub const DEFAULT_ROUTE_IPV6_CIDR: &str = "::/0";
/// Pattern of the automatically created default route.
pub const DEFAULT_ROUTE_NAME_PATTERN: &str = "^default-route-[0-9a-f]{16}$";

// ============================================================================
// SECTION: Regional Names
// ============================================================================

/// Abbreviates a region: `us-west1` becomes `us-we1`.
///
/// # Errors
///
/// Returns [`BuilderError::Region`] when the region does not have the
/// `{area}-{location}{digit}` shape.
pub fn region_abbreviation(region: &str) -> Result<String, BuilderError> {
    let invalid = || BuilderError::Region(region.to_string());
    let mut parts = region.split('-');
    let (Some(area), Some(location), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let digit = location.chars().last().filter(|c| matches!(c, '1'..='9')).ok_or_else(invalid)?;
    let area: String = area.chars().take(2).collect();
    let location: String = location.chars().take(2).collect();
    let letters = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_lowercase());
    if !letters(&area) || !letters(&location) {
        return Err(invalid());
    }
    Ok(format!("{area}-{location}{digit}"))
}

/// Returns the subnet name for a region.
///
/// # Errors
///
/// Returns [`BuilderError`] when the region cannot be abbreviated or the
/// result is not a valid resource name.
pub fn subnet_name(name: &str, region: &str) -> Result<String, BuilderError> {
    let generated = format!("{name}-{}", region_abbreviation(region)?);
    if !is_valid_resource_name(&generated) {
        return Err(BuilderError::Name(generated));
    }
    Ok(generated)
}

/// Returns the anchored pattern every subnet name must match.
#[must_use]
pub fn subnet_name_pattern(name: &str) -> String {
    format!("^{}(?:-[a-z]{{2}}){{2}}[1-9]$", regex::escape(name))
}

/// Returns true when `candidate` follows the subnet naming rule for `name`.
#[must_use]
pub fn is_subnet_name(name: &str, candidate: &str) -> bool {
    Regex::new(&subnet_name_pattern(name)).is_ok_and(|regex| regex.is_match(candidate))
}

// ============================================================================
// SECTION: Global Names
// ============================================================================

/// Returns the name of the restricted APIs route.
#[must_use]
pub fn restricted_route_name(name: &str) -> String {
    format!("{name}-restricted-apis")
}

/// Returns the name of the private APIs route.
#[must_use]
pub fn private_route_name(name: &str) -> String {
    format!("{name}-private-apis")
}

/// Returns the name of the tagged NAT route.
#[must_use]
pub fn tagged_nat_route_name(name: &str) -> String {
    format!("{name}-tagged-nat")
}

/// Returns the PSC forwarding rule name.
///
/// # Errors
///
/// Returns [`BuilderError::Name`] when nothing valid remains after stripping.
pub fn forwarding_rule_name(name: &str) -> Result<String, BuilderError> {
    let generated: String = name
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(FORWARDING_RULE_NAME_LEN)
        .collect();
    if !is_valid_resource_name(&generated) {
        return Err(BuilderError::Name(generated));
    }
    Ok(generated)
}

/// Returns the default internet gateway link for a project.
#[must_use]
pub fn default_gateway(project: &str) -> String {
    format!(
        "{}projects/{project}/global/gateways/default-internet-gateway",
        vpc_assert_core::runtime::COMPUTE_API_PREFIX
    )
}

/// Expands a short gateway reference into a full link.
#[must_use]
pub fn gateway_link(project: &str, gateway: &str) -> String {
    if gateway.starts_with("https://") {
        return gateway.to_string();
    }
    if let Some(tail) = gateway.strip_prefix("global/gateways/") {
        return gateway_link(project, tail);
    }
    if gateway.starts_with("projects/") {
        return format!("{}{gateway}", vpc_assert_core::runtime::COMPUTE_API_PREFIX);
    }
    format!(
        "{}projects/{project}/global/gateways/{gateway}",
        vpc_assert_core::runtime::COMPUTE_API_PREFIX
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================
