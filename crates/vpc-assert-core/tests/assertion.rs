// crates/vpc-assert-core/tests/assertion.rs
// ============================================================================
// Module: Assertion Engine Tests
// Description: Field predicates, counts, and collection checks.
// Purpose: Ensure evaluate emits the right findings in a stable order.
// Dependencies: vpc-assert-core, serde_json
// ============================================================================
//! ## Overview
//! Validates the pure comparator against hand-built observed records.

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

use serde_json::json;
use vpc_assert_core::CollectionCheck;
use vpc_assert_core::ControlName;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::FieldExpectation;
use vpc_assert_core::FindingKind;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::Verdict;
use vpc_assert_core::evaluate;
use vpc_assert_core::runtime::check_value;

use crate::common::record;

/// Builds a subnetwork expectation used across tests.
fn subnet_expectation() -> ExpectedState {
    ExpectedState::new(
        ControlName::new("subnets"),
        "subnet[us-west1]",
        ResourceClass::Subnetwork,
        ResourceFilter::project("my-project-123").in_region("us-west1").named("net-us-we1"),
    )
}

// ============================================================================
// SECTION: Counts
// ============================================================================

/// Verifies a missing resource yields a single failing count finding.
#[test]
fn missing_resource_fails_count_only() {
    let expected = subnet_expectation().expect(FieldCheck::equals("purpose", "PRIVATE"));
    let findings = evaluate(&expected, &[]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::Count);
    assert_eq!(findings[0].verdict, Verdict::Fail);
    assert_eq!(findings[0].observed, json!(0));
}

/// Verifies a zero-count expectation passes when nothing is observed.
#[test]
fn zero_count_passes_on_empty_observation() {
    let expected = subnet_expectation()
        .with_count(0)
        .expect(FieldCheck::equals("purpose", "PRIVATE"));
    assert!(expected.fields.is_empty());
    let findings = evaluate(&expected, &[]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].passed());
    assert!(findings[0].message.contains("should not exist"));
}

/// Verifies an unexpected resource fails the zero-count finding.
#[test]
fn zero_count_fails_when_resource_exists() {
    let expected = subnet_expectation().with_count(0);
    let observed = vec![record(ResourceClass::Subnetwork, json!({"name": "net-us-we1"}))];
    let findings = evaluate(&expected, &observed);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].verdict, Verdict::Fail);
}

// ============================================================================
// SECTION: Fields
// ============================================================================

/// Verifies each field check produces one finding in declaration order.
#[test]
fn field_checks_are_reported_in_order() {
    let expected = subnet_expectation()
        .expect(FieldCheck::equals("purpose", "PRIVATE"))
        .expect(FieldCheck::absent("role"))
        .expect(FieldCheck::equals("log_config.enable", true))
        .expect(FieldCheck::equals("private_ip_google_access", false));
    let observed = vec![record(
        ResourceClass::Subnetwork,
        json!({
            "name": "net-us-we1",
            "purpose": "PRIVATE",
            "log_config": {"enable": false}
        }),
    )];
    let findings = evaluate(&expected, &observed);
    let fields: Vec<_> = findings.iter().filter_map(|f| f.field.as_deref()).collect();
    assert_eq!(
        fields,
        vec!["purpose", "role", "log_config.enable", "private_ip_google_access"]
    );
    assert!(findings[0].passed());
    assert!(findings[1].passed());
    assert!(findings[2].passed());
    assert_eq!(findings[3].verdict, Verdict::Fail);
    assert!(findings[4].passed(), "missing boolean equals false");
}

/// Verifies missing fields compare equal to zero values only.
#[test]
fn missing_field_equals_zero_value() {
    assert!(check_value(&FieldExpectation::Equals(json!("")), None).passed);
    assert!(check_value(&FieldExpectation::Equals(json!([])), None).passed);
    assert!(check_value(&FieldExpectation::Equals(json!(false)), None).passed);
    assert!(!check_value(&FieldExpectation::Equals(json!("PRIVATE")), None).passed);
    assert!(!check_value(&FieldExpectation::Equals(json!(0)), None).passed);
}

/// Verifies includes handles lists, objects, and scalars.
#[test]
fn includes_supports_lists_and_objects() {
    let labels = json!({"env": "prod", "team": "net"});
    assert!(check_value(&FieldExpectation::Includes(json!({"env": "prod"})), Some(&labels)).passed);
    assert!(!check_value(&FieldExpectation::Includes(json!({"env": "dev"})), Some(&labels)).passed);

    let tags = json!(["nat", "web", "db"]);
    assert!(check_value(&FieldExpectation::Includes(json!(["nat", "db"])), Some(&tags)).passed);
    assert!(check_value(&FieldExpectation::Includes(json!("web")), Some(&tags)).passed);
    assert!(!check_value(&FieldExpectation::Includes(json!(["ssh"])), Some(&tags)).passed);
}

/// Verifies pattern, length, and each-in predicates.
#[test]
fn pattern_length_and_membership_predicates() {
    let name = json!("default-route-0123456789abcdef");
    let matches = FieldExpectation::Matches("^default-route-[0-9a-f]{16}$".to_string());
    assert!(check_value(&matches, Some(&name)).passed);

    let invalid = FieldExpectation::Matches("(".to_string());
    let outcome = check_value(&invalid, Some(&name));
    assert!(!outcome.passed);
    assert!(outcome.detail.is_some());

    let links = json!([
        "https://www.googleapis.com/compute/v1/projects/p-12345/regions/us-west1/subnetworks/a",
        "projects/p-12345/regions/us-east1/subnetworks/b"
    ]);
    assert!(check_value(&FieldExpectation::Length(2), Some(&links)).passed);
    assert!(check_value(&FieldExpectation::Length(0), None).passed);

    let allowed = FieldExpectation::EachIn(vec![
        json!("projects/p-12345/regions/us-west1/subnetworks/a"),
        json!("https://www.googleapis.com/compute/v1/projects/p-12345/regions/us-east1/subnetworks/b"),
    ]);
    assert!(check_value(&allowed, Some(&links)).passed);
    let narrow = FieldExpectation::EachIn(vec![json!("projects/p-12345/regions/us-west1/subnetworks/a")]);
    assert!(!check_value(&narrow, Some(&links)).passed);
}

/// Verifies CIDR predicates report invalid input as failures with detail.
#[test]
fn cidr_predicates() {
    let range = json!("10.0.4.0/22");
    assert!(check_value(&FieldExpectation::InCidr("10.0.0.0/16".to_string()), Some(&range)).passed);
    assert!(!check_value(&FieldExpectation::InCidr("10.1.0.0/16".to_string()), Some(&range)).passed);
    assert!(check_value(&FieldExpectation::PrefixLength(22), Some(&range)).passed);

    let outcome = check_value(&FieldExpectation::InCidr("10.0.0.0/16".to_string()), Some(&json!("nope")));
    assert!(!outcome.passed);
    assert!(outcome.detail.unwrap().contains("invalid cidr"));
}

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Verifies keyed collection checks address elements by key field.
#[test]
fn keyed_collection_checks() {
    let expected = subnet_expectation().expect_collection(
        CollectionCheck::over("secondary_ip_ranges")
            .keyed_by("range_name")
            .for_key("pods", FieldCheck::equals("ip_cidr_range", "10.100.0.0/16"))
            .for_key("services", FieldCheck::equals("ip_cidr_range", "10.101.0.0/20")),
    );
    let observed = vec![record(
        ResourceClass::Subnetwork,
        json!({
            "name": "net-us-we1",
            "secondary_ip_ranges": [
                {"range_name": "pods", "ip_cidr_range": "10.100.0.0/16"}
            ]
        }),
    )];
    let findings = evaluate(&expected, &observed);
    assert_eq!(findings.len(), 3);
    assert_eq!(findings[1].field.as_deref(), Some("secondary_ip_ranges[pods].ip_cidr_range"));
    assert!(findings[1].passed());
    assert_eq!(findings[2].verdict, Verdict::Fail);
    assert!(findings[2].message.contains("no element with range_name=services"));
}

/// Verifies element checks run against every element with indexed paths.
#[test]
fn each_element_checks() {
    let expected = ExpectedState::new(
        ControlName::new("nats"),
        "nat[us-west1]",
        ResourceClass::NatGateway,
        ResourceFilter::project("my-project-123"),
    )
    .expect_collection(
        CollectionCheck::over("subnetworks")
            .each(FieldCheck::includes("source_ip_ranges_to_nat", "ALL_IP_RANGES")),
    );
    let observed = vec![record(
        ResourceClass::NatGateway,
        json!({
            "name": "net-us-we1",
            "subnetworks": [
                {"source_ip_ranges_to_nat": ["ALL_IP_RANGES"]},
                {"source_ip_ranges_to_nat": ["PRIMARY_IP_RANGE"]}
            ]
        }),
    )];
    let findings = evaluate(&expected, &observed);
    assert_eq!(findings.len(), 3);
    assert_eq!(findings[1].field.as_deref(), Some("subnetworks[0].source_ip_ranges_to_nat"));
    assert!(findings[1].passed());
    assert_eq!(findings[2].verdict, Verdict::Fail);
}

/// Verifies multiple matches are labelled and visited in name order.
#[test]
fn multiple_matches_are_labelled_by_name() {
    let expected = ExpectedState::new(
        ControlName::new("routes"),
        "default-route",
        ResourceClass::Route,
        ResourceFilter::project("my-project-123"),
    )
    .with_count(2)
    .expect(FieldCheck::equals("priority", 1000));
    let observed = vec![
        record(ResourceClass::Route, json!({"name": "b-route", "priority": 1000})),
        record(ResourceClass::Route, json!({"name": "a-route", "priority": 900})),
    ];
    let findings = evaluate(&expected, &observed);
    assert_eq!(findings.len(), 3);
    assert!(findings[0].passed());
    assert_eq!(findings[1].resource.as_str(), "default-route#a-route");
    assert_eq!(findings[1].verdict, Verdict::Fail);
    assert_eq!(findings[2].resource.as_str(), "default-route#b-route");
    assert!(findings[2].passed());
}
