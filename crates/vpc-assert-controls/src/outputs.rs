// crates/vpc-assert-controls/src/outputs.rs
// ============================================================================
// Module: Outputs Control
// Description: Structural and consistency checks over module outputs.
// Purpose: Build the `outputs` control without touching the provider.
// Dependencies: serde_json, vpc-assert-core
// ============================================================================

//! ## Overview
//! The module reports its subnets twice: keyed by name and keyed by region.
//! This control checks that every reported self-link is well formed, that
//! subnet keys follow the naming rule, that both maps describe the same
//! subnets, and that each gateway is the first host of its primary range.
//! All findings are computed from the snapshot alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use serde_json::Value;
use serde_json::json;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::Finding;
use vpc_assert_core::FindingKind;
use vpc_assert_core::KeyedView;
use vpc_assert_core::ResourceId;
use vpc_assert_core::SelfLinkPattern;
use vpc_assert_core::Verdict;
use vpc_assert_core::cross_check;
use vpc_assert_core::runtime::check_self_link;

use crate::context::BuildContext;
use crate::context::first_host;
use crate::naming::is_subnet_name;
use crate::naming::subnet_name_pattern;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Control name.
pub const CONTROL: &str = "outputs";

/// Label of the name-keyed subnet output.
const SUBNETS_LABEL: &str = "subnets";
/// Label of the region-keyed subnet output.
const SUBNETS_BY_REGION_LABEL: &str = "subnets_by_region";

// ============================================================================
// SECTION: Control
// ============================================================================

/// Builds the `outputs` control.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(CONTROL);
    let mut plan = ControlPlan::new(control.clone(), "Ensure module outputs are consistent");
    plan.push_findings(network_link_findings(ctx, &control));
    plan.push_findings(subnet_key_findings(ctx, &control));
    plan.push_findings(cross_check(
        &control,
        &KeyedView::new(SUBNETS_LABEL, &ctx.inputs.subnets, Some("region")),
        &KeyedView::new(SUBNETS_BY_REGION_LABEL, &ctx.inputs.subnets_by_region, Some("name")),
        |_, entry| entry.get("region").and_then(Value::as_str).map(str::to_string),
    ));
    plan.push_findings(gateway_findings(ctx, &control));
    plan
}

/// Checks the network self-link shape and identity.
fn network_link_findings(ctx: &BuildContext<'_>, control: &ControlName) -> Vec<Finding> {
    let inputs = ctx.inputs;
    let resource = ResourceId::new("output.self_link");
    let (finding, coordinates) = check_self_link(
        control,
        &resource,
        "self_link",
        SelfLinkPattern::NETWORK,
        inputs.network_self_link.as_deref(),
    );
    let mut findings = vec![finding];
    if let Some(coordinates) = coordinates {
        let passed = coordinates.project == inputs.project_id && coordinates.name == inputs.name;
        findings.push(
            Finding::new(control, &resource, FindingKind::Structural)
                .on_field("self_link")
                .with_values(
                    json!({"project": inputs.project_id, "name": inputs.name}),
                    json!({"project": coordinates.project, "name": coordinates.name}),
                )
                .with_verdict(Verdict::from_bool(passed))
                .with_message(format!(
                    "self_link should name network {} in project {}",
                    inputs.name, inputs.project_id
                )),
        );
    }
    findings
}

/// Checks subnet keys and self-links of the name-keyed output.
fn subnet_key_findings(ctx: &BuildContext<'_>, control: &ControlName) -> Vec<Finding> {
    let inputs = ctx.inputs;
    let pattern = subnet_name_pattern(&inputs.name);
    let mut findings = Vec::new();
    for (key, entry) in &inputs.subnets {
        let resource = ResourceId::new(format!("{SUBNETS_LABEL}[{key}]"));
        let valid = is_subnet_name(&inputs.name, key);
        findings.push(
            Finding::new(control, &resource, FindingKind::Structural)
                .on_field("key")
                .with_values(json!({"pattern": pattern}), json!(key))
                .with_verdict(Verdict::from_bool(valid))
                .with_message(format!("subnet key {key} should match {pattern}")),
        );
        let (finding, _) = check_self_link(
            control,
            &resource,
            "self_link",
            SelfLinkPattern::SUBNETWORK,
            entry.get("self_link").and_then(Value::as_str),
        );
        findings.push(finding);
    }
    findings
}

/// Checks each reported gateway against the first host of its range.
fn gateway_findings(ctx: &BuildContext<'_>, control: &ControlName) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (key, entry) in &ctx.inputs.subnets {
        let range = entry.get("primary_ipv4_cidr").and_then(Value::as_str).filter(|r| !r.is_empty());
        let gateway = entry.get("gateway_address").and_then(Value::as_str).filter(|g| !g.is_empty());
        let (Some(range), Some(gateway)) = (range, gateway) else {
            continue;
        };
        let resource = ResourceId::new(format!("{SUBNETS_LABEL}[{key}]"));
        let base = Finding::new(control, &resource, FindingKind::Consistency).on_field("gateway_address");
        let expected = range.parse::<ipnet::IpNet>().ok().and_then(|net| first_host(&net));
        let finding = match expected {
            Some(host) => {
                let passed = gateway.parse::<IpAddr>().is_ok_and(|observed| observed == host);
                base.with_values(json!(host.to_string()), json!(gateway))
                    .with_verdict(Verdict::from_bool(passed))
                    .with_message(format!("gateway_address should be the first host of {range}"))
            }
            None => base
                .with_values(json!(range), json!(gateway))
                .with_verdict(Verdict::Fail)
                .with_message(format!("primary_ipv4_cidr {range} is not a valid cidr")),
        };
        findings.push(finding);
    }
    findings
}
