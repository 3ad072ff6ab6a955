// crates/vpc-assert-controls/src/network.rs
// ============================================================================
// Module: Network Control
// Description: Expected state of the VPC network itself.
// Purpose: Build the `networks` control.
// Dependencies: serde_json, vpc-assert-core
// ============================================================================

//! ## Overview
//! One custom-mode network per module instance, attached to exactly one
//! subnet per region and never peered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::FieldExpectation;
use vpc_assert_core::ResourceClass;

use crate::context::BuildContext;

// ============================================================================
// SECTION: Control
// ============================================================================

/// Control name.
pub const CONTROL: &str = "networks";

/// Builds the `networks` control.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(CONTROL);
    let inputs = ctx.inputs;
    let subnet_links: Vec<Value> =
        ctx.subnets.iter().map(|subnet| Value::String(subnet.self_link.clone())).collect();

    let network = ExpectedState::new(
        control.clone(),
        format!("network[{}]", inputs.name),
        ResourceClass::Network,
        ctx.project_filter().named(&inputs.name),
    )
    .expect(FieldCheck::equals("name", inputs.name.as_str()))
    .expect(FieldCheck::equals("description", inputs.description.as_str()))
    .expect(FieldCheck::new("subnetworks", FieldExpectation::Length(ctx.subnets.len())))
    .expect(FieldCheck::new("subnetworks", FieldExpectation::EachIn(subnet_links)))
    .expect(FieldCheck::equals("auto_create_subnetworks", false))
    .expect(FieldCheck::equals("routing_config.routing_mode", inputs.options.routing_mode.as_str()))
    .expect(FieldCheck::absent("peerings"))
    .expect(FieldCheck::equals("mtu", inputs.options.mtu))
    .expect(FieldCheck::equals("enable_ula_internal_ipv6", inputs.options.ipv6_ula));

    let mut plan = ControlPlan::new(control, "Ensure the VPC network is configured as expected");
    plan.push_resource(network);
    plan
}
