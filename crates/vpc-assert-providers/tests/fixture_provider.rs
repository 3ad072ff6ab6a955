// crates/vpc-assert-providers/tests/fixture_provider.rs
// ============================================================================
// Module: Fixture Provider Tests
// Description: Loading and filtering of observed-state documents.
// Purpose: Ensure fixtures are validated strictly and filtered like live data.
// Dependencies: vpc-assert-providers, vpc-assert-core, tempfile, serde_json
// ============================================================================

//! ## Overview
//! Writes fixture documents to temporary files and queries them.

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

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::ResourceProvider;
use vpc_assert_providers::FixtureProvider;

const LINK: &str = "https://www.googleapis.com/compute/v1/projects/p-1";
const MAX_BYTES: usize = 1024 * 1024;

/// Returns a fixture with two regional subnets and one route.
fn sample() -> Value {
    json!({
        "networks": [{"name": "prod-net", "project": "p-1"}],
        "subnetworks": [
            {
                "name": "prod-net-us-we1",
                "self_link": format!("{LINK}/regions/us-west1/subnetworks/prod-net-us-we1"),
                "region": format!("{LINK}/regions/us-west1"),
                "network": format!("{LINK}/global/networks/prod-net")
            },
            {
                "name": "prod-net-us-ce1",
                "self_link": format!("{LINK}/regions/us-central1/subnetworks/prod-net-us-ce1"),
                "region": format!("{LINK}/regions/us-central1"),
                "network": format!("{LINK}/global/networks/prod-net")
            }
        ],
        "routes": [{"name": "prod-net-egress-internet", "project": "p-1"}]
    })
}

/// Writes `content` to a file named `name` in a fresh directory.
fn write(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Verifies queries apply region and network constraints.
#[test]
fn queries_apply_filters() {
    let (_dir, path) = write("observed.json", &sample().to_string());
    let provider = FixtureProvider::load(&path, MAX_BYTES).unwrap();
    let filter = ResourceFilter::project("p-1")
        .on_network(format!("{LINK}/global/networks/prod-net"))
        .in_region("us-central1");
    let found = provider.query(ResourceClass::Subnetwork, &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), Some("prod-net-us-ce1"));
    assert_eq!(provider.count(ResourceClass::Subnetwork), 2);
}

/// Verifies NATs inherit their router's network and match network filters.
#[test]
fn nats_take_router_network() {
    let network = format!("{LINK}/global/networks/prod-net");
    let provider = FixtureProvider::from_value(json!({
        "routers": [
            {"name": "legacy-router", "project": "p-1", "region": "us-central1", "network": &network}
        ],
        "nats": [
            {"name": "prod-net-us-ce1", "project": "p-1", "region": "us-central1", "router": "legacy-router"},
            {"name": "orphan", "project": "p-1", "region": "us-central1", "router": "missing-router"}
        ]
    }))
    .unwrap();
    let filter = ResourceFilter::project("p-1").on_network(network.clone()).in_region("us-central1");
    let found = provider.query(ResourceClass::NatGateway, &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), Some("prod-net-us-ce1"));
    assert_eq!(found[0].field("network"), Some(&json!(network)));
}

/// Verifies an absent collection yields zero matches.
#[test]
fn absent_collection_is_empty() {
    let provider = FixtureProvider::from_value(sample()).unwrap();
    let found = provider.query(ResourceClass::Router, &ResourceFilter::project("p-1")).unwrap();
    assert!(found.is_empty());
}

/// Verifies records from another project are excluded.
#[test]
fn other_projects_are_excluded() {
    let provider = FixtureProvider::from_value(sample()).unwrap();
    let found = provider.query(ResourceClass::Route, &ResourceFilter::project("p-2")).unwrap();
    assert!(found.is_empty());
}

/// Verifies YAML fixtures are accepted by extension.
#[test]
fn yaml_fixture_loads() {
    let yaml = "global_addresses:\n  - name: psc\n    project: p-1\n    address: 10.255.0.2\n";
    let (_dir, path) = write("observed.yaml", yaml);
    let provider = FixtureProvider::load(&path, MAX_BYTES).unwrap();
    let found = provider
        .query(ResourceClass::GlobalAddress, &ResourceFilter::project("p-1").named("psc"))
        .unwrap();
    assert_eq!(found[0].field("address"), Some(&json!("10.255.0.2")));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Verifies unknown collections are rejected.
#[test]
fn unknown_collection_is_rejected() {
    let err = FixtureProvider::from_value(json!({"firewalls": []})).unwrap_err();
    assert!(matches!(err, ProviderError::Invalid(message) if message.contains("firewalls")));
}

/// Verifies non-object records are rejected with their position.
#[test]
fn non_object_record_is_rejected() {
    let err = FixtureProvider::from_value(json!({"routes": [{"name": "a"}, "b"]})).unwrap_err();
    assert!(matches!(err, ProviderError::Invalid(message) if message.contains("routes[1]")));
}

/// Verifies the document root must be an object.
#[test]
fn non_object_root_is_rejected() {
    assert!(FixtureProvider::from_value(json!([])).is_err());
}

/// Verifies the size limit is enforced.
#[test]
fn oversized_fixture_is_rejected() {
    let (_dir, path) = write("observed.json", &sample().to_string());
    let err = FixtureProvider::load(&path, 32).unwrap_err();
    assert!(matches!(err, ProviderError::Invalid(message) if message.contains("size limit")));
}

/// Verifies malformed JSON is rejected.
#[test]
fn malformed_json_is_rejected() {
    let (_dir, path) = write("observed.json", "{\"routes\": [");
    assert!(FixtureProvider::load(&path, MAX_BYTES).is_err());
}
