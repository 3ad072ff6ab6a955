// crates/vpc-assert-controls/src/lib.rs
// ============================================================================
// Module: VPC Assert Controls Library
// Description: Expectation builders for every networking control.
// Purpose: Derive an evaluation plan from typed module inputs.
// Dependencies: vpc-assert-config, vpc-assert-core, ipnet, regex
// ============================================================================

//! ## Overview
//! Each module builds one family of controls from [`ModuleInputs`]. The
//! builders are pure: they compute expected state and snapshot-only findings
//! and never talk to a provider. [`build_plan`] assembles them in a fixed
//! order.
//!
//! [`ModuleInputs`]: vpc_assert_config::ModuleInputs

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod error;
pub mod naming;
pub mod network;
pub mod outputs;
pub mod plan;
pub mod psc;
pub mod router;
pub mod routes;
pub mod subnetwork;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::BuildContext;
pub use context::RegionalSubnet;
pub use error::BuilderError;
pub use plan::CONTROL_NAMES;
pub use plan::ControlSelection;
pub use plan::build_plan;
