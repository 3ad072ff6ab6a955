// crates/vpc-assert-controls/tests/scenarios.rs
// ============================================================================
// Module: Control Scenario Tests
// Description: Feature flags, counts, and predicates end to end.
// Purpose: Ensure built expectations judge observed state correctly.
// Dependencies: vpc-assert-controls, vpc-assert-core, serde_json
// ============================================================================
//! ## Overview
//! Builds plans for representative inputs and evaluates the expectations
//! against hand-built observed records, filtered the way the engine filters.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use serde_json::json;
use vpc_assert_config::NatConfig;
use vpc_assert_config::PscConfig;
use vpc_assert_config::SecondaryRange;
use vpc_assert_controls::ControlSelection;
use vpc_assert_controls::build_plan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::Finding;
use vpc_assert_core::FindingKind;
use vpc_assert_core::ObservedResource;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::Verdict;
use vpc_assert_core::evaluate;

use crate::common::NETWORK_LINK;
use crate::common::PROJECT;
use crate::common::expectations;
use crate::common::inputs;
use crate::common::record;

/// Evaluates an expectation against the records its filter selects.
fn judge(expected: &ExpectedState, records: &[ObservedResource]) -> Vec<Finding> {
    let matched: Vec<ObservedResource> = records
        .iter()
        .filter(|record| record.class == expected.class && expected.filter.matches(record))
        .cloned()
        .collect();
    evaluate(expected, &matched)
}

/// Returns a router record on the fixture network.
fn router(region: &str, name: &str) -> ObservedResource {
    record(
        ResourceClass::Router,
        json!({
            "name": name,
            "region": format!("https://www.googleapis.com/compute/v1/projects/{PROJECT}/regions/{region}"),
            "network": NETWORK_LINK,
        }),
    )
}

/// Returns a NAT record named `name` attached to `router`.
fn nat(region: &str, router: &str, name: &str) -> ObservedResource {
    record(
        ResourceClass::NatGateway,
        json!({
            "name": name,
            "region": region,
            "router": router,
            "network": NETWORK_LINK,
            "log_config": {"enable": false, "filter": "ALL"},
        }),
    )
}

// ============================================================================
// SECTION: NAT
// ============================================================================

/// Verifies one router and one NAT are expected per region when NAT is on.
#[test]
fn nat_enabled_expects_one_router_per_region() {
    let mut inputs = inputs(&["us-central1", "us-east1"]);
    inputs.nat = Some(NatConfig {
        tags: Vec::new(),
        logging_filter: None,
    });
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let nats = expectations(&plan, "nats");
    let routers: Vec<_> = nats.iter().filter(|e| e.class == ResourceClass::Router).collect();
    assert_eq!(routers.len(), 2);
    assert!(nats.iter().all(|expected| expected.count == 1));

    let records = vec![
        router("us-central1", "prod-net-us-ce1"),
        router("us-east1", "prod-net-us-ea1"),
        nat("us-central1", "prod-net-us-ce1", "prod-net-us-ce1"),
        nat("us-east1", "prod-net-us-ea1", "prod-net-us-ea1"),
    ];
    let findings: Vec<Finding> = nats.iter().flat_map(|e| judge(e, &records)).collect();
    let router_counts = findings
        .iter()
        .filter(|f| f.kind == FindingKind::Count && f.resource.as_str().starts_with("router["))
        .count();
    assert_eq!(router_counts, 2);
    assert!(findings.iter().all(Finding::passed), "{findings:#?}");
}

/// Verifies a misnamed router fails its name check but still counts its NAT.
#[test]
fn misnamed_router_keeps_nat_count() {
    let mut inputs = inputs(&["us-central1"]);
    inputs.nat = Some(NatConfig {
        tags: Vec::new(),
        logging_filter: None,
    });
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let nats = expectations(&plan, "nats");

    let records = vec![
        router("us-central1", "legacy-router"),
        nat("us-central1", "legacy-router", "prod-net-us-ce1"),
    ];
    let findings: Vec<Finding> = nats.iter().flat_map(|e| judge(e, &records)).collect();
    let failed: Vec<_> = findings.iter().filter(|f| !f.passed()).collect();
    assert_eq!(failed.len(), 1, "{failed:#?}");
    assert_eq!(failed[0].resource.as_str(), "router[us-central1]");
    assert_eq!(failed[0].field.as_deref(), Some("name"));
    let nat_count = findings
        .iter()
        .find(|f| f.kind == FindingKind::Count && f.resource.as_str() == "nat[us-central1]")
        .unwrap();
    assert!(nat_count.passed());
}

/// Verifies NAT off expects nothing and flags a stray router.
#[test]
fn nat_disabled_flags_unexpected_router() {
    let inputs = inputs(&["us-central1", "us-east1"]);
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let nats = expectations(&plan, "nats");
    assert!(nats.iter().all(|expected| expected.count == 0 && expected.fields.is_empty()));

    let records = vec![router("us-east1", "prod-net-us-ea1")];
    let findings: Vec<Finding> = nats.iter().flat_map(|e| judge(e, &records)).collect();
    assert_eq!(findings.len(), 4, "only count findings when disabled");
    let failed: Vec<_> = findings.iter().filter(|f| !f.passed()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].resource.as_str(), "router[us-east1]");
}

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Verifies a surviving default route fails when routes should be deleted.
#[test]
fn deleted_default_route_still_present_fails() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.options.delete_default_routes = true;
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let routes = expectations(&plan, "default-vpc-route");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].count, 0);

    let records = vec![record(
        ResourceClass::Route,
        json!({
            "name": "default-route-0123456789abcdef",
            "network": NETWORK_LINK,
            "dest_range": "0.0.0.0/0",
            "priority": 1000,
        }),
    )];
    let findings = judge(routes[0], &records);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].verdict, Verdict::Fail);
    assert_eq!(findings[0].expected, json!(0));
    assert_eq!(findings[0].observed, json!(1));
}

/// Verifies dual-stack networks also expect the IPv6 default route gone.
#[test]
fn ula_network_checks_ipv6_default_route() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.options.delete_default_routes = true;
    inputs.options.ipv6_ula = true;
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let routes = expectations(&plan, "default-vpc-route");
    let resources: Vec<_> = routes.iter().map(|route| route.resource.as_str()).collect();
    assert_eq!(resources, vec!["default-route", "default-route-ipv6"]);
    assert!(routes.iter().all(|route| route.count == 0));

    let records = vec![record(
        ResourceClass::Route,
        json!({
            "name": "default-route-fedcba9876543210",
            "network": NETWORK_LINK,
            "dest_range": "::/0",
            "priority": 1000,
        }),
    )];
    assert!(judge(routes[0], &records).iter().all(Finding::passed));
    let findings = judge(routes[1], &records);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].verdict, Verdict::Fail);
    assert_eq!(findings[0].observed, json!(1));

    inputs.options.ipv6_ula = false;
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    assert_eq!(expectations(&plan, "default-vpc-route").len(), 1);
}

/// Verifies PSC suppresses both Google API routes.
#[test]
fn psc_supersedes_api_routes() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.options.restricted_apis = true;
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    assert_eq!(expectations(&plan, "restricted-api-route")[0].count, 1);
    assert_eq!(expectations(&plan, "private-api-route")[0].count, 0);

    inputs.psc = Some(PscConfig {
        address: "10.0.0.5".to_string(),
    });
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    assert_eq!(expectations(&plan, "restricted-api-route")[0].count, 0);
    assert_eq!(expectations(&plan, "private-api-route")[0].count, 0);
}

/// Verifies the tagged NAT route follows the NAT tags.
#[test]
fn tagged_nat_route_follows_tags() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.nat = Some(NatConfig {
        tags: vec!["egress".to_string()],
        logging_filter: Some("ERRORS_ONLY".to_string()),
    });
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let route = expectations(&plan, "tagged-nat-route")[0];
    assert_eq!(route.count, 1);
    let records = vec![record(
        ResourceClass::Route,
        json!({
            "name": "prod-net-tagged-nat",
            "network": NETWORK_LINK,
            "dest_range": "0.0.0.0/0",
            "priority": 900,
            "description": "Route to NAT gateway for tagged resources",
            "next_hop_gateway": format!(
                "https://www.googleapis.com/compute/v1/projects/{PROJECT}/global/gateways/default-internet-gateway"
            ),
            "tags": ["egress", "web"],
        }),
    )];
    let findings = judge(route, &records);
    assert!(findings.iter().all(Finding::passed), "{findings:#?}");
}

// ============================================================================
// SECTION: PSC
// ============================================================================

/// Verifies the forwarding rule target follows restricted API access.
#[test]
fn psc_forwarding_rule_target() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.options.restricted_apis = true;
    inputs.psc = Some(PscConfig {
        address: "10.0.0.5".to_string(),
    });
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let rule = expectations(&plan, "psc")
        .into_iter()
        .find(|e| e.class == ResourceClass::ForwardingRule)
        .unwrap();
    assert_eq!(rule.resource.as_str(), "forwarding-rule[prodnet]");

    let observed = |target: &str| {
        vec![record(
            ResourceClass::ForwardingRule,
            json!({
                "name": "prodnet",
                "target": target,
                "network": NETWORK_LINK,
                "ip_address": "10.0.0.5",
            }),
        )]
    };
    let target_verdict = |target: &str| {
        judge(rule, &observed(target))
            .into_iter()
            .find(|f| f.field.as_deref() == Some("target"))
            .map(|f| f.verdict)
    };
    assert_eq!(target_verdict("all-apis"), Some(Verdict::Fail));
    assert_eq!(target_verdict("vpc-sc"), Some(Verdict::Pass));
}

// ============================================================================
// SECTION: Subnets
// ============================================================================

/// Verifies secondary ranges check containment and size separately.
#[test]
fn secondary_range_size_mismatch() {
    let mut inputs = inputs(&["us-west1"]);
    inputs.cidrs.secondaries = BTreeMap::from([("svc".to_string(), SecondaryRange {
        cidr: "10.1.0.0/24".to_string(),
        subnet_size: 24,
    })]);
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let subnet = expectations(&plan, "subnets")[0];
    let records = vec![record(
        ResourceClass::Subnetwork,
        json!({
            "name": "prod-net-us-we1",
            "region": "https://www.googleapis.com/compute/v1/projects/my-project-123/regions/us-west1",
            "network": NETWORK_LINK,
            "ip_cidr_range": "172.16.0.0/24",
            "purpose": "PRIVATE",
            "private_ipv6_google_access": "DISABLE_GOOGLE_ACCESS",
            "stack_type": "IPV4_ONLY",
            "secondary_ip_ranges": [{"range_name": "svc", "ip_cidr_range": "10.1.0.0/25"}],
        }),
    )];
    let findings = judge(subnet, &records);
    let secondary: Vec<_> = findings
        .iter()
        .filter(|f| f.field.as_deref() == Some("secondary_ip_ranges[svc].ip_cidr_range"))
        .collect();
    assert_eq!(secondary.len(), 2);
    assert!(secondary[0].passed(), "containment holds");
    assert_eq!(secondary[1].verdict, Verdict::Fail, "size differs");
    let others: Vec<_> = findings
        .iter()
        .filter(|f| !f.passed() && f.field.as_deref() != Some("secondary_ip_ranges[svc].ip_cidr_range"))
        .collect();
    assert!(others.is_empty(), "{others:#?}");
}

/// Verifies a secondary range shared by every region still builds a plan.
#[test]
fn shared_secondary_range_across_regions() {
    let mut inputs = inputs(&["us-west1", "us-east1"]);
    inputs.cidrs.secondaries = BTreeMap::from([("svc".to_string(), SecondaryRange {
        cidr: "10.1.0.0/24".to_string(),
        subnet_size: 24,
    })]);
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let subnets = expectations(&plan, "subnets");
    assert_eq!(subnets.len(), 2);
    let records = vec![record(
        ResourceClass::Subnetwork,
        json!({
            "name": "prod-net-us-ea1",
            "region": "https://www.googleapis.com/compute/v1/projects/my-project-123/regions/us-east1",
            "network": NETWORK_LINK,
            "ip_cidr_range": "172.16.1.0/24",
            "purpose": "PRIVATE",
            "private_ipv6_google_access": "DISABLE_GOOGLE_ACCESS",
            "stack_type": "IPV4_ONLY",
            "secondary_ip_ranges": [{"range_name": "svc", "ip_cidr_range": "10.1.0.0/24"}],
        }),
    )];
    let findings = judge(subnets[1], &records);
    let failed: Vec<_> = findings.iter().filter(|f| !f.passed()).collect();
    assert!(failed.is_empty(), "{failed:#?}");
    assert_eq!(
        findings
            .iter()
            .filter(|f| f.field.as_deref() == Some("secondary_ip_ranges[svc].ip_cidr_range"))
            .count(),
        2
    );
}

/// Verifies region blocks are allocated in region order.
#[test]
fn region_blocks_follow_region_order() {
    let inputs = inputs(&["us-west1", "us-central1", "us-east4"]);
    let plan = build_plan(&inputs, &ControlSelection::all()).unwrap();
    let blocks: Vec<_> = expectations(&plan, "subnets")
        .iter()
        .filter_map(|expected| {
            expected
                .fields
                .iter()
                .filter(|check| check.field == "ip_cidr_range")
                .find_map(|check| match &check.expectation {
                    vpc_assert_core::FieldExpectation::Equals(value) => value.as_str().map(str::to_string),
                    _ => None,
                })
        })
        .collect();
    assert_eq!(blocks, vec!["172.16.0.0/24", "172.16.1.0/24", "172.16.2.0/24"]);
}
