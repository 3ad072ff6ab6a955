// crates/vpc-assert-controls/tests/common/mod.rs
// ============================================================================
// Module: Controls Test Fixtures
// Description: Module input builders and plan lookups for control tests.
// Purpose: Keep scenario tests focused on the expectations they check.
// Dependencies: vpc-assert-config, vpc-assert-core, serde_json
// ============================================================================

//! ## Overview
//! [`inputs`] returns a two-region network with every optional feature off;
//! tests switch features on by mutating the returned value.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use serde_json::json;
use vpc_assert_config::CidrConfig;
use vpc_assert_config::ModuleInputs;
use vpc_assert_config::NetworkOptions;
use vpc_assert_config::SchemaVersion;
use vpc_assert_core::EvaluationPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::Finding;
use vpc_assert_core::ObservedResource;
use vpc_assert_core::PlannedCheck;
use vpc_assert_core::ResourceClass;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Project used by every fixture.
pub const PROJECT: &str = "my-project-123";
/// Network name used by every fixture.
pub const NAME: &str = "prod-net";
/// Canonical network self-link.
pub const NETWORK_LINK: &str =
    "https://www.googleapis.com/compute/v1/projects/my-project-123/global/networks/prod-net";

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Returns module inputs for `regions` with optional features disabled.
pub fn inputs(regions: &[&str]) -> ModuleInputs {
    ModuleInputs {
        schema_version: SchemaVersion::V2,
        project_id: PROJECT.to_string(),
        name: NAME.to_string(),
        description: "custom vpc".to_string(),
        regions: regions.iter().map(|region| (*region).to_string()).collect(),
        network_self_link: Some(NETWORK_LINK.to_string()),
        options: NetworkOptions {
            mtu: 1460,
            routing_mode: "GLOBAL".to_string(),
            delete_default_routes: false,
            restricted_apis: false,
            flow_logs: false,
            ipv6_ula: false,
        },
        cidrs: CidrConfig {
            primary: "172.16.0.0/16".to_string(),
            primary_subnet_size: 24,
            secondaries: BTreeMap::new(),
        },
        nat: None,
        psc: None,
        routes: Vec::new(),
        labels: BTreeMap::new(),
        flow_logs: None,
        subnets: BTreeMap::new(),
        subnets_by_region: BTreeMap::new(),
    }
}

/// Returns consistent subnet outputs for two regions.
pub fn subnet_outputs(inputs: &mut ModuleInputs) {
    let entries = [("us-west1", "us-we1", "172.16.0.0/24", "172.16.0.1"), (
        "us-central1",
        "us-ce1",
        "172.16.1.0/24",
        "172.16.1.1",
    )];
    for (region, abbrev, cidr, gateway) in entries {
        let name = format!("{NAME}-{abbrev}");
        let self_link = format!(
            "https://www.googleapis.com/compute/v1/projects/{PROJECT}/regions/{region}/subnetworks/{name}"
        );
        let common = json!({
            "self_link": self_link,
            "id": format!("projects/{PROJECT}/regions/{region}/subnetworks/{name}"),
            "primary_ipv4_cidr": cidr,
            "primary_ipv6_cidr": "",
            "secondary_ipv4_cidrs": {},
            "gateway_address": gateway,
        });
        let mut by_name = common.clone();
        by_name["region"] = json!(region);
        let mut by_region = common;
        by_region["name"] = json!(name);
        inputs.subnets.insert(name, by_name);
        inputs.subnets_by_region.insert(region.to_string(), by_region);
    }
}

// ============================================================================
// SECTION: Plan Lookups
// ============================================================================

/// Returns the resource expectations of one control.
pub fn expectations<'a>(plan: &'a EvaluationPlan, control: &str) -> Vec<&'a ExpectedState> {
    plan.controls
        .iter()
        .filter(|entry| entry.control.as_str() == control)
        .flat_map(|entry| entry.checks.iter())
        .filter_map(|check| match check {
            PlannedCheck::Resource(expected) => Some(expected),
            PlannedCheck::Precomputed(_) => None,
        })
        .collect()
}

/// Returns the precomputed findings of one control.
pub fn precomputed<'a>(plan: &'a EvaluationPlan, control: &str) -> Vec<&'a Finding> {
    plan.controls
        .iter()
        .filter(|entry| entry.control.as_str() == control)
        .flat_map(|entry| entry.checks.iter())
        .filter_map(|check| match check {
            PlannedCheck::Precomputed(findings) => Some(findings.iter()),
            PlannedCheck::Resource(_) => None,
        })
        .flatten()
        .collect()
}

/// Builds an observed record.
pub fn record(class: ResourceClass, value: Value) -> ObservedResource {
    ObservedResource::from_value(class, value).expect("record must be an object")
}
