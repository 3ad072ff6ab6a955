// crates/vpc-assert-core/src/core/mod.rs
// ============================================================================
// Module: VPC Assert Core Types
// Description: Canonical resource, expectation, and finding structures.
// Purpose: Provide stable, serializable types shared by every VPC Assert crate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe what a resource should look like ([`ExpectedState`]),
//! what the provider returned ([`ObservedResource`]), and the outcome of each
//! comparison ([`Finding`]). These types are the canonical source for plan and
//! report output.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod expectation;
pub mod finding;
pub mod hashing;
pub mod identifiers;
pub mod resource;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use expectation::CollectionCheck;
pub use expectation::ExpectedState;
pub use expectation::FieldCheck;
pub use expectation::FieldExpectation;
pub use finding::ControlSummary;
pub use finding::Finding;
pub use finding::FindingKind;
pub use finding::Report;
pub use finding::ReportStatus;
pub use finding::ReportSummary;
pub use finding::Verdict;
pub use hashing::CanonicalJsonError;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::ControlName;
pub use identifiers::ResourceId;
pub use resource::NameFilter;
pub use resource::ObservedResource;
pub use resource::ResourceClass;
pub use resource::ResourceCoordinates;
pub use resource::ResourceFilter;
