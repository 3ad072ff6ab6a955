// crates/vpc-assert-controls/src/subnetwork.rs
// ============================================================================
// Module: Subnetwork Control
// Description: Expected state of the per-region subnets.
// Purpose: Build the `subnets` control.
// Dependencies: regex, serde_json, vpc-assert-config, vpc-assert-core
// ============================================================================

//! ## Overview
//! One private subnet per region. Its primary range is the region's block of
//! the primary CIDR; IPv6, private Google access, and flow logs follow the
//! network options. Secondary ranges are keyed by `range_name` and only
//! checked for containment and size, since their placement inside the parent
//! range is left to the module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use vpc_assert_config::FlowLogConfig;
use vpc_assert_core::CollectionCheck;
use vpc_assert_core::ControlName;
use vpc_assert_core::ControlPlan;
use vpc_assert_core::ExpectedState;
use vpc_assert_core::FieldCheck;
use vpc_assert_core::FieldExpectation;
use vpc_assert_core::ResourceClass;

use crate::context::BuildContext;
use crate::context::RegionalSubnet;
use crate::naming::subnet_name_pattern;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Control name.
pub const CONTROL: &str = "subnets";

/// IPv6 access mode when ULA is enabled.
const IPV6_ACCESS_ENABLED: &str = "ENABLE_OUTBOUND_VM_ACCESS_TO_GOOGLE";
/// IPv6 access mode when ULA is disabled.
const IPV6_ACCESS_DISABLED: &str = "DISABLE_GOOGLE_ACCESS";

// ============================================================================
// SECTION: Control
// ============================================================================

/// Builds the `subnets` control.
#[must_use]
pub fn build(ctx: &BuildContext<'_>) -> ControlPlan {
    let control = ControlName::new(CONTROL);
    let mut plan = ControlPlan::new(control.clone(), "Ensure VPC subnetworks are configured as expected");
    for subnet in &ctx.subnets {
        plan.push_resource(expected_subnet(ctx, &control, subnet));
    }
    plan
}

/// Builds the expectation for one regional subnet.
fn expected_subnet(
    ctx: &BuildContext<'_>,
    control: &ControlName,
    subnet: &RegionalSubnet,
) -> ExpectedState {
    let inputs = ctx.inputs;
    let options = &inputs.options;
    let (ipv6_access, stack_type) = if options.ipv6_ula {
        (IPV6_ACCESS_ENABLED, "IPV4_IPV6")
    } else {
        (IPV6_ACCESS_DISABLED, "IPV4_ONLY")
    };

    let mut expected = ExpectedState::new(
        control.clone(),
        format!("subnet[{}]", subnet.region),
        ResourceClass::Subnetwork,
        ctx.network_filter().in_region(&subnet.region).named(&subnet.name),
    )
    .expect(FieldCheck::matches("name", subnet_name_pattern(&inputs.name)))
    .expect(FieldCheck::equals("name", subnet.name.as_str()))
    .expect(FieldCheck::absent("description"))
    .expect(FieldCheck::matches("region", format!("(?:^|/){}$", regex::escape(&subnet.region))))
    .expect(FieldCheck::new("ip_cidr_range", FieldExpectation::InCidr(inputs.cidrs.primary.clone())))
    .expect(FieldCheck::new(
        "ip_cidr_range",
        FieldExpectation::PrefixLength(inputs.cidrs.primary_subnet_size),
    ))
    .expect(FieldCheck::equals("ip_cidr_range", subnet.ip_cidr_range.to_string()))
    .expect(FieldCheck::equals("purpose", "PRIVATE"))
    .expect(FieldCheck::absent("role"))
    .expect(FieldCheck::equals("private_ip_google_access", options.restricted_apis))
    .expect(FieldCheck::equals("private_ipv6_google_access", ipv6_access))
    .expect(FieldCheck::equals("stack_type", stack_type));

    if options.ipv6_ula {
        expected = expected
            .expect(FieldCheck::present("ipv6_cidr_range"))
            .expect(FieldCheck::present("internal_ipv6_prefix"))
            .expect(FieldCheck::absent("external_ipv6_prefix"));
    }

    expected = expected
        .expect(FieldCheck::equals("log_config.enable", options.flow_logs))
        .expect(FieldCheck::equals("enable_flow_logs", options.flow_logs));
    if options.flow_logs
        && let Some(flow_logs) = &inputs.flow_logs
    {
        expected = flow_log_checks(expected, flow_logs);
    }

    if inputs.cidrs.secondaries.is_empty() {
        return expected.expect(FieldCheck::absent("secondary_ip_ranges"));
    }
    let mut ranges = CollectionCheck::over("secondary_ip_ranges").keyed_by("range_name");
    for (range_name, secondary) in &inputs.cidrs.secondaries {
        ranges = ranges
            .for_key(
                range_name.as_str(),
                FieldCheck::new("ip_cidr_range", FieldExpectation::InCidr(secondary.cidr.clone())),
            )
            .for_key(
                range_name.as_str(),
                FieldCheck::new("ip_cidr_range", FieldExpectation::PrefixLength(secondary.subnet_size)),
            );
    }
    expected
        .expect(FieldCheck::new(
            "secondary_ip_ranges",
            FieldExpectation::Length(inputs.cidrs.secondaries.len()),
        ))
        .expect_collection(ranges)
}

/// Adds checks for the configured flow-log settings.
fn flow_log_checks(mut expected: ExpectedState, flow_logs: &FlowLogConfig) -> ExpectedState {
    if let Some(interval) = &flow_logs.aggregation_interval {
        expected = expected.expect(FieldCheck::equals("log_config.aggregation_interval", interval.as_str()));
    }
    if let Some(sampling) = flow_logs.flow_sampling {
        expected = expected.expect(FieldCheck::equals("log_config.flow_sampling", sampling));
    }
    if let Some(metadata) = &flow_logs.metadata {
        expected = expected.expect(FieldCheck::equals("log_config.metadata", metadata.as_str()));
    }
    let fields: Vec<Value> =
        flow_logs.metadata_fields.iter().cloned().map(Value::String).collect();
    expected = expected.expect(FieldCheck::equals("log_config.metadata_fields", fields));
    if let Some(filter) = &flow_logs.filter_expr {
        expected = expected.expect(FieldCheck::equals("log_config.filter_expr", filter.as_str()));
    }
    expected
}
