// crates/vpc-assert-controls/src/context.rs
// ============================================================================
// Module: Build Context
// Description: Values derived once from module inputs and shared by controls.
// Purpose: Compute names, links, and CIDR blocks before any control is built.
// Dependencies: ipnet, vpc-assert-config, vpc-assert-core
// ============================================================================

//! ## Overview
//! [`BuildContext::new`] validates the CIDR plan and allocates one block per
//! region: region `i` receives the `i`-th block of size
//! `primary_subnet_size` inside the primary range. Every control reads its
//! regional names and blocks from here, so a broken input fails the whole
//! plan before any expectation exists.
//!
//! Secondary ranges are only parsed here. Their per-subnet ranges are checked
//! for containment and prefix length, not against an allocated block, so a
//! secondary range smaller than one block per region is still a valid plan.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ipnet::IpNet;
use vpc_assert_config::ModuleInputs;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceCoordinates;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::runtime::self_link_url;

use crate::error::BuilderError;
use crate::naming::subnet_name;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Expected subnet of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalSubnet {
    /// Region name.
    pub region: String,
    /// Subnet, router, and NAT name.
    pub name: String,
    /// Allocated primary block.
    pub ip_cidr_range: IpNet,
    /// Canonical subnet self-link.
    pub self_link: String,
}

/// Shared values for expectation builders.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    /// Adapted module inputs.
    pub inputs: &'a ModuleInputs,
    /// Network link used to scope queries.
    pub network_link: String,
    /// One subnet per region, in region order.
    pub subnets: Vec<RegionalSubnet>,
}

impl<'a> BuildContext<'a> {
    /// Derives names, links, and blocks from module inputs.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError`] when a CIDR is invalid, a block cannot be
    /// allocated, or a generated name is invalid.
    pub fn new(inputs: &'a ModuleInputs) -> Result<Self, BuilderError> {
        let primary = parse_cidr("output_cidrs_json.primary", &inputs.cidrs.primary)?;
        for (range_name, secondary) in &inputs.cidrs.secondaries {
            parse_cidr(
                &format!("output_cidrs_json.secondaries.{range_name}.cidr"),
                &secondary.cidr,
            )?;
        }
        let mut subnets = Vec::with_capacity(inputs.regions.len());
        for (index, region) in inputs.regions.iter().enumerate() {
            let name = subnet_name(&inputs.name, region)?;
            let ip_cidr_range =
                allocate_block(&primary, inputs.cidrs.primary_subnet_size, index, region)?;
            let coordinates = ResourceCoordinates::regional(&inputs.project_id, region, &name);
            subnets.push(RegionalSubnet {
                region: region.clone(),
                self_link: self_link_url(ResourceClass::Subnetwork, &coordinates),
                name,
                ip_cidr_range,
            });
        }
        let network_link = inputs.network_self_link.clone().unwrap_or_else(|| {
            self_link_url(
                ResourceClass::Network,
                &ResourceCoordinates::global(&inputs.project_id, &inputs.name),
            )
        });
        Ok(Self {
            inputs,
            network_link,
            subnets,
        })
    }

    /// Returns a filter scoped to the project.
    #[must_use]
    pub fn project_filter(&self) -> ResourceFilter {
        ResourceFilter::project(&self.inputs.project_id)
    }

    /// Returns a filter scoped to the project and network.
    #[must_use]
    pub fn network_filter(&self) -> ResourceFilter {
        self.project_filter().on_network(&self.network_link)
    }
}

// ============================================================================
// SECTION: CIDR Helpers
// ============================================================================

/// Parses a CIDR, reporting the input field on failure.
///
/// # Errors
///
/// Returns [`BuilderError::InvalidCidr`] when the text is not a CIDR.
pub fn parse_cidr(field: &str, value: &str) -> Result<IpNet, BuilderError> {
    value.trim().parse::<IpNet>().map_err(|_| BuilderError::InvalidCidr {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Returns the `index`-th block of length `prefix` inside `parent`.
///
/// # Errors
///
/// Returns [`BuilderError::Allocation`] when the prefix is shorter than the
/// parent's or the parent has fewer than `index + 1` blocks.
pub fn allocate_block(
    parent: &IpNet,
    prefix: u8,
    index: usize,
    region: &str,
) -> Result<IpNet, BuilderError> {
    let failure = || BuilderError::Allocation {
        region: region.to_string(),
        parent: parent.to_string(),
        prefix,
        index,
    };
    parent.trunc().subnets(prefix).map_err(|_| failure())?.nth(index).ok_or_else(failure)
}

/// Returns the first usable host of a range: the subnet gateway.
#[must_use]
pub fn first_host(range: &IpNet) -> Option<std::net::IpAddr> {
    range.trunc().hosts().next()
}
