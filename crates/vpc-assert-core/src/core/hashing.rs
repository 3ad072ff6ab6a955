// crates/vpc-assert-core/src/core/hashing.rs
// ============================================================================
// Module: VPC Assert Report Digests
// Description: Canonical JSON bytes and SHA-256 report digests.
// Purpose: Give reports a stable digest so repeated runs can be compared.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! A report digest is SHA-256 over the RFC 8785 (JCS) form of the report's
//! findings, so two runs against the same snapshot and observed state produce
//! the same digest. Renderers reuse [`canonical_json_bytes`] for JSON output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Digest algorithm recorded on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable label for the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Report digest in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced `value`.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl HashDigest {
    /// Digests the canonical JSON form of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalJsonError`] when `value` cannot be serialized.
    pub fn of_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, CanonicalJsonError> {
        let bytes = canonical_json_bytes(value)?;
        let value = Sha256::digest(&bytes).iter().fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        });
        Ok(Self {
            algorithm: HashAlgorithm::Sha256,
            value,
        })
    }
}

/// Canonical JSON serialization failure.
#[derive(Debug, Error)]
#[error("canonical json serialization failed: {0}")]
pub struct CanonicalJsonError(String);

// ============================================================================
// SECTION: Canonical JSON
// ============================================================================

/// Serializes `value` as RFC 8785 canonical JSON.
///
/// # Errors
///
/// Returns [`CanonicalJsonError`] when `value` cannot be serialized.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalJsonError> {
    serde_jcs::to_vec(value).map_err(|err| CanonicalJsonError(err.to_string()))
}
