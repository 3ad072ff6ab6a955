// crates/vpc-assert-controls/src/psc.rs
// ============================================================================
// Module: Private Service Connect Control
// Description: Expected PSC global address and forwarding rule.
// Purpose: Build the `psc` control.
// Dependencies: serde_json, vpc-assert-core
// ============================================================================

//! ## Overview
//! A configured PSC address yields an internal global address named after
//! the network and a global forwarding rule targeting the `vpc-sc` bundle
//! when restricted APIs are enabled, `all-apis` otherwise. Without an address
//! both resources must be absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::ResourceClass;

use crate::context::BuildContext;
use crate::error::BuilderError;
use crate::naming::forwarding_rule_name;

// ============================================================================
// SECTION: Control
// ============================================================================

/// Control name.
pub const CONTROL: &str = "psc";

/// Builds the `psc` control.
///
/// # Errors
///
/// Returns [`BuilderError::Name`] when the forwarding rule name is invalid.
pub fn build(ctx: &BuildContext<'_>) -> Result<ControlPlan, BuilderError> {
    let control = ControlName::new(CONTROL);
    let inputs = ctx.inputs;
    let address = inputs.psc_address();
    let count = usize::from(address.is_some());
    let address = address.unwrap_or_default();
    let rule_name = forwarding_rule_name(&inputs.name)?;
    let target = if inputs.options.restricted_apis { "vpc-sc" } else { "all-apis" };

    let global_address = ExpectedState::new(
        control.clone(),
        format!("global-address[{}]", inputs.name),
        ResourceClass::GlobalAddress,
        ctx.project_filter().named(&inputs.name),
    )
    .with_count(count)
    .expect(FieldCheck::equals("address", address))
    .expect(FieldCheck::equals("address_type", "INTERNAL"))
    .expect(FieldCheck::equals("purpose", "PRIVATE_SERVICE_CONNECT"))
    .expect(FieldCheck::equals("network", ctx.network_link.as_str()));

    let mut forwarding_rule = ExpectedState::new(
        control.clone(),
        format!("forwarding-rule[{rule_name}]"),
        ResourceClass::ForwardingRule,
        ctx.project_filter().named(&rule_name),
    )
    .with_count(count)
    .expect(FieldCheck::equals("target", target))
    .expect(FieldCheck::equals("network", ctx.network_link.as_str()))
    .expect(FieldCheck::equals("ip_address", address))
    .expect(FieldCheck::absent("load_balancing_scheme"));
    if !inputs.labels.is_empty() {
        forwarding_rule = forwarding_rule.expect(FieldCheck::includes("labels", json!(inputs.labels)));
    }

    let mut plan = ControlPlan::new(control, "Ensure PSC endpoint meets expectations");
    plan.push_resource(global_address);
    plan.push_resource(forwarding_rule);
    Ok(plan)
}
