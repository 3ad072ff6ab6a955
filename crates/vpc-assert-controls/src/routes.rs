// crates/vpc-assert-controls/src/routes.rs
// ============================================================================
// Module: Route Controls
// Description: Expected default, Google API, NAT, and user-declared routes.
// Purpose: Build the route controls.
// Dependencies: serde_json, vpc-assert-config, vpc-assert-core
// ============================================================================

//! ## Overview
//! Route expectations select candidates by network, name, and destination,
//! then assert the remaining attributes. Dual-stack (ULA) networks also get
//! an IPv6 default route, which follows the same delete option as the IPv4
//! one. A PSC endpoint replaces both Google API routes, so neither is
//! expected while a PSC address is configured.
//! Undeclared next hops on user routes must be absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use vpc_assert_config::RouteDecl;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::ResourceClass;

use crate::context::BuildContext;
use crate::naming::DEFAULT_ROUTE_CIDR;
use crate::naming::DEFAULT_ROUTE_IPV6_CIDR;
use crate::naming::DEFAULT_ROUTE_NAME_PATTERN;
use crate::naming::PRIVATE_APIS_CIDR;
use crate::naming::RESTRICTED_APIS_CIDR;
use crate::naming::default_gateway;
use crate::naming::gateway_link;
use crate::naming::private_route_name;
use crate::naming::restricted_route_name;
use crate::naming::tagged_nat_route_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default route control name.
pub const DEFAULT_ROUTE_CONTROL: &str = "default-vpc-route";
/// Restricted APIs route control name.
pub const RESTRICTED_ROUTE_CONTROL: &str = "restricted-api-route";
/// Private APIs route control name.
pub const PRIVATE_ROUTE_CONTROL: &str = "private-api-route";
/// Tagged NAT route control name.
pub const TAGGED_NAT_ROUTE_CONTROL: &str = "tagged-nat-route";
/// User route control name.
pub const USER_ROUTES_CONTROL: &str = "routes";

/// Priority of system-managed routes.
const SYSTEM_ROUTE_PRIORITY: u32 = 1000;
/// Priority of the tagged NAT route.
const TAGGED_NAT_PRIORITY: u32 = 900;

// ============================================================================
// SECTION: System Routes
// ============================================================================

/// Builds the `default-vpc-route` control.
#[must_use]
pub fn build_default(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(DEFAULT_ROUTE_CONTROL);
    let count = usize::from(!ctx.inputs.options.delete_default_routes);
    let mut plan = ControlPlan::new(control.clone(), "Ensure default VPC route matches expectations");
    plan.push_resource(default_route(ctx, &control, "default-route", DEFAULT_ROUTE_CIDR, count));
    if ctx.inputs.options.ipv6_ula {
        plan.push_resource(default_route(
            ctx,
            &control,
            "default-route-ipv6",
            DEFAULT_ROUTE_IPV6_CIDR,
            count,
        ));
    }
    plan
}

/// Expects `count` system default routes to `dest_range`.
fn default_route(
    ctx: &BuildContext<'_>,
    control: &ControlName,
    resource: &str,
    dest_range: &str,
    count: usize,
) -> ExpectedState {
    ExpectedState::new(
        control.clone(),
        resource,
        ResourceClass::Route,
        ctx.network_filter()
            .name_pattern(DEFAULT_ROUTE_NAME_PATTERN)
            .with_attribute("dest_range", json!(dest_range))
            .with_attribute("priority", json!(SYSTEM_ROUTE_PRIORITY)),
    )
    .with_count(count)
}

/// Builds the `restricted-api-route` control.
#[must_use]
pub fn build_restricted(ctx: &BuildContext<'_>) -> ControlPlan {
    let restricted = ctx.inputs.options.restricted_apis;
    api_route(
        ctx,
        ApiRoute {
            control: RESTRICTED_ROUTE_CONTROL,
            title: "Ensure route to Google restricted API endpoint matches expectations",
            name: restricted_route_name(&ctx.inputs.name),
            dest_range: RESTRICTED_APIS_CIDR,
            description: "Route for restricted Google API access",
            enabled: restricted,
        },
    )
}

/// Builds the `private-api-route` control.
#[must_use]
pub fn build_private(ctx: &BuildContext<'_>) -> ControlPlan {
    let restricted = ctx.inputs.options.restricted_apis;
    api_route(
        ctx,
        ApiRoute {
            control: PRIVATE_ROUTE_CONTROL,
            title: "Ensure route to Google private API endpoint matches expectations",
            name: private_route_name(&ctx.inputs.name),
            dest_range: PRIVATE_APIS_CIDR,
            description: "Route for private Google API access",
            enabled: !restricted,
        },
    )
}

/// Google API route variant.
struct ApiRoute {
    /// Control name.
    control: &'static str,
    /// Control title.
    title: &'static str,
    /// Route name.
    name: String,
    /// Destination VIP range.
    dest_range: &'static str,
    /// Route description.
    description: &'static str,
    /// Whether the variant is selected by the options.
    enabled: bool,
}

/// Builds one Google API route control.
fn api_route(ctx: &BuildContext<'_>, variant: ApiRoute) -> ControlPlan {
    let control = ControlName::new(variant.control);
    let count = usize::from(variant.enabled && ctx.inputs.psc_address().is_none());
    let route = ExpectedState::new(
        control.clone(),
        format!("route[{}]", variant.name),
        ResourceClass::Route,
        ctx.network_filter()
            .named(&variant.name)
            .with_attribute("dest_range", json!(variant.dest_range)),
    )
    .with_count(count)
    .expect(FieldCheck::equals("description", variant.description))
    .expect(FieldCheck::equals("next_hop_gateway", default_gateway(&ctx.inputs.project_id)))
    .expect(FieldCheck::equals("priority", SYSTEM_ROUTE_PRIORITY));
    let mut plan = ControlPlan::new(control, variant.title);
    plan.push_resource(route);
    plan
}

/// Builds the `tagged-nat-route` control.
#[must_use]
pub fn build_tagged_nat(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(TAGGED_NAT_ROUTE_CONTROL);
    let tags = ctx.inputs.nat_tags();
    let name = tagged_nat_route_name(&ctx.inputs.name);
    let route = ExpectedState::new(
        control.clone(),
        format!("route[{name}]"),
        ResourceClass::Route,
        ctx.network_filter()
            .named(&name)
            .with_attribute("dest_range", json!(DEFAULT_ROUTE_CIDR)),
    )
    .with_count(usize::from(!tags.is_empty()))
    .expect(FieldCheck::equals("description", "Route to NAT gateway for tagged resources"))
    .expect(FieldCheck::equals("next_hop_gateway", default_gateway(&ctx.inputs.project_id)))
    .expect(FieldCheck::equals("priority", TAGGED_NAT_PRIORITY))
    .expect(FieldCheck::includes("tags", json!(tags)));
    let mut plan = ControlPlan::new(control, "Ensure tagged route to NAT matches expectations");
    plan.push_resource(route);
    plan
}

// ============================================================================
// SECTION: User Routes
// ============================================================================

/// Builds the `routes` control for user-declared routes.
#[must_use]
pub fn build_user_routes(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(USER_ROUTES_CONTROL);
    let mut plan = ControlPlan::new(control.clone(), "Ensure declared routes match expectations");
    for route in &ctx.inputs.routes {
        plan.push_resource(user_route(ctx, &control, route));
    }
    plan
}

/// Builds the expectation for one declared route.
fn user_route(ctx: &BuildContext<'_>, control: &ControlName, route: &RouteDecl) -> ExpectedState {
    let mut expected = ExpectedState::new(
        control.clone(),
        format!("route[{}]", route.name),
        ResourceClass::Route,
        ctx.network_filter().named(&route.name),
    )
    .expect(FieldCheck::equals("dest_range", route.dest_range.as_str()))
    .expect(FieldCheck::equals("description", route.description.as_str()))
    .expect(FieldCheck::equals("priority", route.priority));
    if !route.tags.is_empty() {
        expected = expected.expect(FieldCheck::includes("tags", json!(route.tags)));
    }
    for (field, declared) in route.next_hops() {
        expected = match declared {
            Some(value) if field == "next_hop_gateway" => expected.expect(FieldCheck::equals(
                field,
                Value::String(gateway_link(&ctx.inputs.project_id, value)),
            )),
            Some(value) => expected.expect(FieldCheck::equals(field, value)),
            None => expected.expect(FieldCheck::absent(field)),
        };
    }
    expected
}
