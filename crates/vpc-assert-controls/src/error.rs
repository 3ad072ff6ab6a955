// crates/vpc-assert-controls/src/error.rs
// ============================================================================
// Module: Expectation Builder Errors
// Description: Fatal errors raised while deriving an evaluation plan.
// Purpose: Separate broken inputs from assertion failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`BuilderError`] means the module inputs cannot describe a consistent
//! network, so no plan is produced. Mismatches against observed state are
//! never builder errors; they become findings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Expectation builder errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// CIDR text did not parse.
    #[error("{field} is not a valid cidr: {value}")]
    InvalidCidr {
        /// Input field holding the CIDR.
        field: String,
        /// Offending value.
        value: String,
    },
    /// Per-region block could not be carved from its parent range.
    #[error("cannot allocate /{prefix} block {index} from {parent} for region {region}")]
    Allocation {
        /// Region needing the block.
        region: String,
        /// Parent range.
        parent: String,
        /// Requested prefix length.
        prefix: u8,
        /// Region index.
        index: usize,
    },
    /// Region name cannot be abbreviated.
    #[error("region {0} cannot be abbreviated")]
    Region(String),
    /// Generated resource name violates its naming rule.
    #[error("generated name {0} is not a valid resource name")]
    Name(String),
    /// Requested control does not exist.
    #[error("unknown control: {0}")]
    UnknownControl(String),
}
