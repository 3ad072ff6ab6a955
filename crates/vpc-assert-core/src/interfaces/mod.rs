// crates/vpc-assert-core/src/interfaces/mod.rs
// ============================================================================
// Module: VPC Assert Interfaces
// Description: Provider-agnostic contract for observed resource state.
// Purpose: Define the seam between the evaluation engine and cloud backends.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine never talks to a cloud API directly. It asks a
//! [`ResourceProvider`] for every resource of a class that matches a
//! [`ResourceFilter`]. Zero matches is a normal answer; transport, auth, and
//! timeout failures are [`ProviderError`]s that affect only the instance
//! being fetched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::resource::ObservedResource;
use crate::core::resource::ResourceClass;
use crate::core::resource::ResourceFilter;

// ============================================================================
// SECTION: Provider Errors
// ============================================================================

/// Errors raised by resource providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport failure or retryable server response.
    #[error("provider transport error: {0}")]
    Transport(String),
    /// Fetch exceeded its time budget.
    #[error("provider timed out after {0} ms")]
    Timeout(u64),
    /// Credentials missing or rejected.
    #[error("provider authorization error: {0}")]
    Auth(String),
    /// Provider cannot serve the resource class or was blocked by policy.
    #[error("provider unsupported: {0}")]
    Unsupported(String),
    /// Provider returned data that could not be interpreted.
    #[error("provider returned invalid data: {0}")]
    Invalid(String),
}

impl ProviderError {
    /// Returns true when retrying the same read may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Returns the stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Auth(_) => "auth",
            Self::Unsupported(_) => "unsupported",
            Self::Invalid(_) => "invalid",
        }
    }
}

// ============================================================================
// SECTION: Resource Provider
// ============================================================================

/// Read-only source of observed resource state.
pub trait ResourceProvider {
    /// Returns every resource of `class` matching `filter`.
    ///
    /// Implementations may over-approximate the filter; callers apply
    /// [`ResourceFilter::matches`] to the result.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the query cannot be answered.
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError>;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Box<P> {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        (**self).query(class, filter)
    }
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for std::sync::Arc<P> {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        (**self).query(class, filter)
    }
}
