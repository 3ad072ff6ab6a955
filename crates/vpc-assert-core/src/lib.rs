// crates/vpc-assert-core/src/lib.rs
// ============================================================================
// Module: VPC Assert Core Library
// Description: Public API surface for the VPC Assert evaluation engine.
// Purpose: Expose core types, provider interfaces, and runtime helpers.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! VPC Assert core evaluates declarative expectations about cloud networking
//! resources against observed state. It is provider-agnostic: observed state
//! arrives through the [`ResourceProvider`] interface, and every comparison is
//! recorded as a [`Finding`] in a deterministic [`Report`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::AuditSink;
pub use audit::FetchAuditEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RunAuditEvent;
pub use audit::StderrAuditSink;
pub use interfaces::ProviderError;
pub use interfaces::ResourceProvider;
pub use runtime::ControlPlan;
pub use runtime::Engine;
pub use runtime::EngineConfig;
pub use runtime::EvaluationPlan;
pub use runtime::KeyedView;
pub use runtime::LocatorError;
pub use runtime::PlannedCheck;
pub use runtime::SelfLinkPattern;
pub use runtime::aggregate;
pub use runtime::cross_check;
pub use runtime::evaluate;
pub use runtime::fetch;
pub use runtime::parse_self_link;
