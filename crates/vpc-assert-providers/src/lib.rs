// crates/vpc-assert-providers/src/lib.rs
// ============================================================================
// Module: VPC Assert Providers
// Description: Built-in observed-state providers and provider selection.
// Purpose: Supply resource records to the evaluation engine.
// Dependencies: vpc-assert-config, vpc-assert-core, reqwest, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! This crate ships two providers behind the core
//! [`vpc_assert_core::ResourceProvider`] interface: a fixture provider that
//! answers from a recorded document, and a Compute Engine REST provider for
//! live projects. Both enforce size limits and treat their inputs as
//! untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fixture;
pub mod gcp;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fixture::FixtureProvider;
pub use fixture::fixture_key;
pub use gcp::GcpComputeProvider;
pub use gcp::normalize_keys;
pub use gcp::snake_case;
pub use registry::SharedProvider;
pub use registry::build_provider;
