// crates/vpc-assert-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared snapshot fixtures and config helpers.
// Purpose: Reduce duplication across integration tests for vpc-assert-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;

use vpc_assert_config::ConfigError;
use vpc_assert_config::VpcAssertConfig;

/// Result type for tests that report failures as messages.
pub type TestResult = Result<(), String>;

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<VpcAssertConfig, ConfigError> {
    VpcAssertConfig::from_toml("")
}

/// Asserts that a result failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected an error".to_string()),
    }
}

/// Returns a two-region V1 snapshot as the provisioning tool emits it.
pub fn v1_raw() -> BTreeMap<String, String> {
    raw(&[
        ("input_project_id", "my-project-123"),
        ("input_name", "prod-net"),
        ("input_regions", "[\"us-west1\", \"us-east1\"]"),
        (
            "output_self_link",
            "https://www.googleapis.com/compute/v1/projects/my-project-123/global/networks/prod-net",
        ),
        (
            "output_options_json",
            r#"{"mtu": 1460, "routing_mode": "GLOBAL", "delete_default_routes": true,
                "restricted_apis": true, "nat": true, "nat_logs": false, "flow_logs": false}"#,
        ),
        (
            "output_cidrs_json",
            r#"{"primary": "172.16.0.0/16", "primary_subnet_size": 24,
                "secondaries": {"pods": {"cidr": "10.100.0.0/16", "subnet_size": 20}}}"#,
        ),
    ])
}

/// Returns a two-region V2 snapshot with NAT, PSC, and flow logs.
pub fn v2_raw() -> BTreeMap<String, String> {
    let mut values = v1_raw();
    values.insert(
        "output_options_json".to_string(),
        r#"{"enable_restricted_apis_access": "false", "ipv6_ula": "true"}"#.to_string(),
    );
    values.insert(
        "output_nat_json".to_string(),
        r#"{"tags": ["egress"], "logging_filter": "ERRORS_ONLY"}"#.to_string(),
    );
    values.insert("output_psc_json".to_string(), r#"{"address": "10.10.10.10"}"#.to_string());
    values.insert(
        "output_flow_logs_json".to_string(),
        r#"{"aggregation_interval": "INTERVAL_5_SEC", "flow_sampling": 0.5,
            "metadata": "INCLUDE_ALL_METADATA", "metadata_fields": [], "filter_expr": "true"}"#
            .to_string(),
    );
    values.insert("input_labels_json".to_string(), r#"{"fixture": "psc"}"#.to_string());
    values
}

/// Builds a raw snapshot map from pairs.
pub fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}
