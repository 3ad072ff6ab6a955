// crates/vpc-assert-core/src/runtime/mod.rs
// ============================================================================
// Module: VPC Assert Runtime
// Description: Locator, assertion engine, cross-checks, aggregation, and executor.
// Purpose: Evaluate expected state against provider observations.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules turn an evaluation plan into a report. The comparator
//! ([`evaluate`]) and cross-checker ([`cross_check`]) are pure; only the
//! [`Engine`] talks to a provider.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod assertion;
pub mod cross_check;
pub mod engine;
pub mod locator;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertion::CidrError;
pub use assertion::FieldOutcome;
pub use assertion::be_in_cidr;
pub use assertion::check_value;
pub use assertion::evaluate;
pub use assertion::has_prefix_length;
pub use cross_check::KeyedView;
pub use cross_check::cross_check;
pub use cross_check::without_fields;
pub use engine::ControlPlan;
pub use engine::Engine;
pub use engine::EngineConfig;
pub use engine::EvaluationPlan;
pub use engine::PlannedCheck;
pub use engine::provider_finding;
pub use locator::COMPUTE_API_PREFIX;
pub use locator::LocatorError;
pub use locator::SelfLinkPattern;
pub use locator::check_self_link;
pub use locator::fetch;
pub use locator::is_valid_resource_name;
pub use locator::parse_self_link;
pub use locator::self_link_for;
pub use locator::self_link_url;
pub use report::aggregate;
