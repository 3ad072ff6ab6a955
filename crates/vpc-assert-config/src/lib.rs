// crates/vpc-assert-config/src/lib.rs
// ============================================================================
// Module: VPC Assert Config Library
// Description: Snapshot loading, module inputs, and run configuration.
// Purpose: Single source of truth for vpc-assert.toml and snapshot semantics.
// Dependencies: vpc-assert-core, serde, serde_json, serde_yaml, toml
// ============================================================================

//! ## Overview
//! `vpc-assert-config` turns provisioning outputs into typed
//! [`ModuleInputs`] and loads the `vpc-assert.toml` run configuration. Both
//! paths validate strictly and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod inputs;
pub mod snapshot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use inputs::CidrConfig;
pub use inputs::FlowLogConfig;
pub use inputs::ModuleInputs;
pub use inputs::NatConfig;
pub use inputs::NetworkOptions;
pub use inputs::PscConfig;
pub use inputs::RouteDecl;
pub use inputs::SchemaAdapter;
pub use inputs::SchemaChoice;
pub use inputs::SchemaVersion;
pub use inputs::SecondaryRange;
pub use inputs::adapt;
pub use inputs::snapshot_schema;
pub use snapshot::ConfigSnapshot;
pub use snapshot::ConfigValue;
pub use snapshot::KeyDecl;
pub use snapshot::KeyKind;
pub use snapshot::Requirement;
pub use snapshot::SnapshotSchema;
pub use snapshot::load_raw_file;

/// Reads a snapshot file and adapts it into module inputs.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or adapted.
pub fn load_module_inputs(
    path: &std::path::Path,
    choice: SchemaChoice,
) -> Result<ModuleInputs, ConfigError> {
    let raw = snapshot::load_raw_file(path)?;
    let snapshot = snapshot::load(&raw, &snapshot_schema())?;
    adapt(&snapshot, choice)
}
