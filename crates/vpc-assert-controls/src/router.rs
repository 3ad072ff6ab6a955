// crates/vpc-assert-controls/src/router.rs
// ============================================================================
// Module: Router and NAT Control
// Description: Expected Cloud Routers and Cloud NAT gateways per region.
// Purpose: Build the `nats` control.
// Dependencies: vpc-assert-core
// ============================================================================

//! ## Overview
//! With NAT enabled every region has exactly one router on the network and
//! one NAT gateway on that router, both named like the region's subnet.
//! With NAT disabled both counts are zero and nothing else is checked.
//!
//! Gateways are selected by network and region, so they are counted on
//! whichever router the region actually has. A misnamed router fails its own
//! name check without also failing the gateway count.

// ============================================================================
// SECTION: Imports
// ============================================================================

use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::ResourceClass;

use crate::context::BuildContext;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Control name.
pub const CONTROL: &str = "nats";

/// NAT log filter reported when no filter is configured.
const DEFAULT_LOG_FILTER: &str = "ALL";

// ============================================================================
// SECTION: Control
// ============================================================================

/// Builds the `nats` control.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(CONTROL);
    let nat = ctx.inputs.nat.as_ref();
    let count = usize::from(nat.is_some());
    let logging_filter = nat.and_then(|nat| nat.logging_filter.as_deref());

    let mut plan =
        ControlPlan::new(control.clone(), "Ensure Cloud Routers and Cloud NATs meet expectations");
    for subnet in &ctx.subnets {
        let router = ExpectedState::new(
            control.clone(),
            format!("router[{}]", subnet.region),
            ResourceClass::Router,
            ctx.network_filter().in_region(&subnet.region),
        )
        .with_count(count)
        .expect(FieldCheck::equals("name", subnet.name.as_str()));

        let gateway = ExpectedState::new(
            control.clone(),
            format!("nat[{}]", subnet.region),
            ResourceClass::NatGateway,
            ctx.network_filter().in_region(&subnet.region),
        )
        .with_count(count)
        .expect(FieldCheck::equals("name", subnet.name.as_str()))
        .expect(FieldCheck::equals("log_config.enable", logging_filter.is_some()))
        .expect(FieldCheck::equals(
            "log_config.filter",
            logging_filter.unwrap_or(DEFAULT_LOG_FILTER),
        ));

        plan.push_resource(router);
        plan.push_resource(gateway);
    }
    plan
}
