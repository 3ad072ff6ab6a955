// crates/vpc-assert-config/src/config.rs
// ============================================================================
// Module: VPC Assert Run Configuration
// Description: Loading and validation for vpc-assert.toml.
// Purpose: Provide strict, fail-closed run settings with hard limits.
// Dependencies: serde, thiserror, toml, vpc-assert-core
// ============================================================================

//! ## Overview
//! Run configuration is loaded from a TOML file with strict size and path
//! limits. An explicit path (CLI flag or environment variable) must exist; a
//! missing default file falls back to built-in defaults. Every numeric limit
//! is range-checked before a run starts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use vpc_assert_core::EngineConfig;

use crate::inputs::SchemaChoice;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "vpc-assert.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VPC_ASSERT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum concurrent fetch workers.
pub(crate) const MAX_WORKERS: usize = 64;
/// Minimum per-fetch timeout in milliseconds.
pub(crate) const MIN_FETCH_TIMEOUT_MS: u64 = 100;
/// Maximum per-fetch timeout in milliseconds.
pub(crate) const MAX_FETCH_TIMEOUT_MS: u64 = 120_000;
/// Maximum retries for transient provider errors.
pub(crate) const MAX_RETRIES: u32 = 5;
/// Maximum initial retry backoff in milliseconds.
pub(crate) const MAX_RETRY_BACKOFF_MS: u64 = 10_000;
/// Maximum fixture document size in bytes.
pub(crate) const MAX_FIXTURE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum GCP response size in bytes.
pub(crate) const MAX_GCP_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum pages followed per GCP list call.
pub(crate) const MAX_GCP_PAGES: usize = 1000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration, snapshot, and module-input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML, JSON, or YAML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Value declared as JSON did not parse.
    #[error("snapshot key {key} is not valid json: {reason}")]
    InvalidJson {
        /// Snapshot key.
        key: String,
        /// Parser message.
        reason: String,
    },
    /// Required key absent without a default.
    #[error("snapshot key {0} is required")]
    MissingKey(String),
    /// Value could not be coerced to the requested type.
    #[error("snapshot key {key} is not a valid {expected}: {value}")]
    Type {
        /// Snapshot key or dotted path.
        key: String,
        /// Expected type label.
        expected: &'static str,
        /// Offending value.
        value: String,
    },
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VpcAssertConfig {
    /// Snapshot source settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Evaluation engine limits.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Observed-state provider selection.
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditSettings,
}

impl VpcAssertConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.snapshot.validate()?;
        self.engine.validate()?;
        self.provider.validate()?;
        self.audit.validate()
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Snapshot source settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot document path; the CLI flag overrides it.
    #[serde(default)]
    pub path: Option<String>,
    /// Schema version selection.
    #[serde(default)]
    pub schema_version: SchemaChoice,
}

impl SnapshotConfig {
    /// Validates snapshot settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("snapshot.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Evaluation engine limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum concurrent fetches.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Per-fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Maximum retries for transient provider errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl EngineSettings {
    /// Converts settings into engine limits.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_workers: self.max_workers,
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Validates engine limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "engine.max_workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        if !(MIN_FETCH_TIMEOUT_MS..=MAX_FETCH_TIMEOUT_MS).contains(&self.fetch_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "engine.fetch_timeout_ms must be between {MIN_FETCH_TIMEOUT_MS} and \
                 {MAX_FETCH_TIMEOUT_MS}"
            )));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "engine.max_retries must be at most {MAX_RETRIES}"
            )));
        }
        if self.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::Invalid(format!(
                "engine.retry_backoff_ms must be at most {MAX_RETRY_BACKOFF_MS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Observed-state provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Observed-state document on disk.
    #[default]
    Fixture,
    /// Compute Engine REST API.
    Gcp,
}

impl ProviderKind {
    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixture => "fixture",
            Self::Gcp => "gcp",
        }
    }
}

/// Provider selection and per-kind settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Selected provider kind.
    #[serde(default)]
    pub kind: ProviderKind,
    /// Fixture provider settings.
    #[serde(default)]
    pub fixture: FixtureSettings,
    /// GCP provider settings.
    #[serde(default)]
    pub gcp: GcpSettings,
}

impl ProviderSettings {
    /// Validates provider settings for the selected kind.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            ProviderKind::Fixture => self.fixture.validate(),
            ProviderKind::Gcp => self.gcp.validate(),
        }
    }
}

/// Fixture provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSettings {
    /// Observed-state document path; the CLI flag overrides it.
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum document size in bytes.
    #[serde(default = "default_fixture_max_bytes")]
    pub max_bytes: usize,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_bytes: default_fixture_max_bytes(),
        }
    }
}

impl FixtureSettings {
    /// Validates fixture settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("provider.fixture.path", path)?;
        }
        if self.max_bytes == 0 || self.max_bytes > MAX_FIXTURE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "provider.fixture.max_bytes must be between 1 and {MAX_FIXTURE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Compute Engine REST provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpSettings {
    /// API base URL.
    #[serde(default = "default_gcp_base_url")]
    pub base_url: String,
    /// Environment variable holding the OAuth access token.
    #[serde(default = "default_gcp_token_env")]
    pub token_env: String,
    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_gcp_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Maximum pages followed per list call.
    #[serde(default = "default_gcp_max_pages")]
    pub max_pages: usize,
    /// User agent sent with requests.
    #[serde(default = "default_gcp_user_agent")]
    pub user_agent: String,
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            base_url: default_gcp_base_url(),
            token_env: default_gcp_token_env(),
            timeout_ms: default_fetch_timeout_ms(),
            max_response_bytes: default_gcp_max_response_bytes(),
            max_pages: default_gcp_max_pages(),
            user_agent: default_gcp_user_agent(),
        }
    }
}

impl GcpSettings {
    /// Validates GCP settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if !base.starts_with("https://") && !base.starts_with("http://") {
            return Err(ConfigError::Invalid(
                "provider.gcp.base_url must be an http(s) url".to_string(),
            ));
        }
        if self.token_env.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.gcp.token_env must be set".to_string()));
        }
        if !(MIN_FETCH_TIMEOUT_MS..=MAX_FETCH_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "provider.gcp.timeout_ms must be between {MIN_FETCH_TIMEOUT_MS} and \
                 {MAX_FETCH_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_GCP_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "provider.gcp.max_response_bytes must be between 1 and {MAX_GCP_RESPONSE_BYTES}"
            )));
        }
        if self.max_pages == 0 || self.max_pages > MAX_GCP_PAGES {
            return Err(ConfigError::Invalid(format!(
                "provider.gcp.max_pages must be between 1 and {MAX_GCP_PAGES}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.gcp.user_agent must be set".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Enables audit events.
    #[serde(default)]
    pub enabled: bool,
    /// JSON-lines log path; stderr when omitted.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditSettings {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// Returns the path and whether it was requested explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
pub(crate) fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default worker count.
const fn default_max_workers() -> usize {
    8
}

/// Default per-fetch timeout.
const fn default_fetch_timeout_ms() -> u64 {
    10_000
}

/// Default retry cap.
const fn default_max_retries() -> u32 {
    2
}

/// Default initial backoff.
const fn default_retry_backoff_ms() -> u64 {
    250
}

/// Default fixture size limit.
const fn default_fixture_max_bytes() -> usize {
    4 * 1024 * 1024
}

/// Default Compute Engine API base URL.
fn default_gcp_base_url() -> String {
    "https://compute.googleapis.com/compute/v1".to_string()
}

/// Default token environment variable.
fn default_gcp_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

/// Default GCP response size limit.
const fn default_gcp_max_response_bytes() -> usize {
    8 * 1024 * 1024
}

/// Default GCP page cap.
const fn default_gcp_max_pages() -> usize {
    20
}

/// Default user agent.
fn default_gcp_user_agent() -> String {
    format!("vpc-assert/{}", env!("CARGO_PKG_VERSION"))
}
