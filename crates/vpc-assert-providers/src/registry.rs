// crates/vpc-assert-providers/src/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Builds the configured observed-state provider.
// Purpose: Map run configuration onto a concrete provider instance.
// Dependencies: vpc-assert-config, vpc-assert-core
// ============================================================================

//! ## Overview
//! The registry turns `[provider]` settings into a shared provider handle. A
//! command-line observed-state path overrides the configured fixture path and
//! is only meaningful for the fixture provider.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use vpc_assert_config::ProviderKind;
use vpc_assert_config::ProviderSettings;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ResourceProvider;

use crate::FixtureProvider;
use crate::GcpComputeProvider;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Shared, thread-safe provider handle used by the engine.
pub type SharedProvider = Arc<dyn ResourceProvider + Send + Sync>;

/// Builds the provider selected by `settings`.
///
/// `observed` overrides `provider.fixture.path`.
///
/// # Errors
///
/// Returns [`ProviderError`] when the fixture cannot be loaded, no fixture
/// path is available, an observed path is given for the GCP provider, or the
/// GCP token is missing.
pub fn build_provider(
    settings: &ProviderSettings,
    observed: Option<&Path>,
) -> Result<SharedProvider, ProviderError> {
    match settings.kind {
        ProviderKind::Fixture => {
            let path = observed
                .map(Path::to_path_buf)
                .or_else(|| settings.fixture.path.as_deref().map(PathBuf::from))
                .ok_or_else(|| {
                    ProviderError::Invalid(
                        "fixture provider requires an observed-state path".to_string(),
                    )
                })?;
            let provider = FixtureProvider::load(&path, settings.fixture.max_bytes)?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Gcp => {
            if observed.is_some() {
                return Err(ProviderError::Unsupported(
                    "observed-state files require the fixture provider".to_string(),
                ));
            }
            Ok(Arc::new(GcpComputeProvider::from_env(settings.gcp.clone())?))
        }
    }
}
