// crates/vpc-assert-config/src/inputs.rs
// ============================================================================
// Module: VPC Assert Module Inputs
// Description: Versioned schema adapters from snapshots to typed module inputs.
// Purpose: Absorb snapshot schema drift before expectations are built.
// Dependencies: serde, serde_json, crate::{config, snapshot}
// ============================================================================

//! ## Overview
//! Two snapshot layouts exist. [`SchemaVersion::V1`] encodes NAT as boolean
//! flags inside the options object and has no private service connect
//! settings. [`SchemaVersion::V2`] carries NAT and PSC as dedicated JSON
//! outputs where `null` means disabled. Each layout has a [`SchemaAdapter`];
//! both yield the same [`ModuleInputs`], so expectation builders never see
//! the difference.
//!
//! Required data that is absent or mistyped is an error. Defaults apply only
//! where the provisioning module itself defines one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::config::ConfigError;
use crate::snapshot::ConfigSnapshot;
use crate::snapshot::KeyDecl;
use crate::snapshot::KeyKind;
use crate::snapshot::SnapshotSchema;
use crate::snapshot::parse_bool;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Snapshot key for the project identifier.
pub const KEY_PROJECT_ID: &str = "input_project_id";
/// Snapshot key for the network name.
pub const KEY_NAME: &str = "input_name";
/// Snapshot key for the network description.
pub const KEY_DESCRIPTION: &str = "input_description";
/// Snapshot key for the region list.
pub const KEY_REGIONS: &str = "input_regions";
/// Snapshot key for user route declarations.
pub const KEY_ROUTES: &str = "input_routes_json";
/// Snapshot key for resource labels.
pub const KEY_LABELS: &str = "input_labels_json";
/// Snapshot key for the network self-link output.
pub const KEY_SELF_LINK: &str = "output_self_link";
/// Snapshot key for the options output.
pub const KEY_OPTIONS: &str = "output_options_json";
/// Snapshot key for the CIDR allocation output.
pub const KEY_CIDRS: &str = "output_cidrs_json";
/// Snapshot key for subnets keyed by name.
pub const KEY_SUBNETS: &str = "output_subnets_json";
/// Snapshot key for subnets keyed by region.
pub const KEY_SUBNETS_BY_REGION: &str = "output_subnets_by_region_json";
/// Snapshot key for the NAT output.
pub const KEY_NAT: &str = "output_nat_json";
/// Snapshot key for the PSC output.
pub const KEY_PSC: &str = "output_psc_json";
/// Snapshot key for the flow-log output.
pub const KEY_FLOW_LOGS: &str = "output_flow_logs_json";
/// Snapshot key pinning the schema version.
pub const KEY_SCHEMA_VERSION: &str = "schema_version";

/// Default network description.
const DEFAULT_DESCRIPTION: &str = "custom vpc";
/// Default network MTU.
const DEFAULT_MTU: u32 = 1460;
/// Default dynamic routing mode.
const DEFAULT_ROUTING_MODE: &str = "GLOBAL";
/// Default user route priority.
const DEFAULT_ROUTE_PRIORITY: u32 = 1000;
/// NAT log filter applied when logging is requested without a filter.
const DEFAULT_NAT_LOG_FILTER: &str = "ALL";

// ============================================================================
// SECTION: Schema Versions
// ============================================================================

/// Snapshot layout version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// NAT flags inside options; no PSC.
    V1,
    /// Dedicated NAT and PSC outputs.
    V2,
}

impl SchemaVersion {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Parses a pinned version label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "1" | "v1" => Some(Self::V1),
            "2" | "v2" => Some(Self::V2),
            _ => None,
        }
    }
}

/// Configured schema selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChoice {
    /// Use the snapshot's pinned version or detect it.
    #[default]
    Auto,
    /// Force the V1 adapter.
    V1,
    /// Force the V2 adapter.
    V2,
}

impl SchemaChoice {
    /// Returns the forced version, if any.
    #[must_use]
    pub const fn pinned(self) -> Option<SchemaVersion> {
        match self {
            Self::Auto => None,
            Self::V1 => Some(SchemaVersion::V1),
            Self::V2 => Some(SchemaVersion::V2),
        }
    }
}

// ============================================================================
// SECTION: Module Inputs
// ============================================================================

/// Network-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkOptions {
    /// Network MTU.
    pub mtu: u32,
    /// Dynamic routing mode.
    pub routing_mode: String,
    /// Whether the default internet route is deleted.
    pub delete_default_routes: bool,
    /// Whether Google APIs are reached through the restricted VIP.
    pub restricted_apis: bool,
    /// Whether subnet flow logs are enabled.
    pub flow_logs: bool,
    /// Whether internal ULA IPv6 is enabled.
    pub ipv6_ula: bool,
}

/// Secondary range allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryRange {
    /// Parent CIDR for the range.
    pub cidr: String,
    /// Prefix length of each per-region block.
    pub subnet_size: u8,
}

/// CIDR allocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CidrConfig {
    /// Primary IPv4 range.
    pub primary: String,
    /// Prefix length of each per-region subnet.
    pub primary_subnet_size: u8,
    /// Secondary ranges keyed by range name.
    pub secondaries: BTreeMap<String, SecondaryRange>,
}

/// Cloud NAT settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NatConfig {
    /// Network tags routed through NAT.
    pub tags: Vec<String>,
    /// Log filter; `None` disables NAT logging.
    pub logging_filter: Option<String>,
}

/// Private service connect settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PscConfig {
    /// Internal endpoint address.
    pub address: String,
}

/// User route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecl {
    /// Route name.
    pub name: String,
    /// Destination range.
    pub dest_range: String,
    /// Route description.
    #[serde(default)]
    pub description: String,
    /// Route priority.
    #[serde(default = "default_route_priority")]
    pub priority: u32,
    /// Network tags; empty applies to all instances.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Next-hop gateway link.
    #[serde(default)]
    pub next_hop_gateway: Option<String>,
    /// Next-hop IP address.
    #[serde(default)]
    pub next_hop_ip: Option<String>,
    /// Next-hop instance link.
    #[serde(default)]
    pub next_hop_instance: Option<String>,
    /// Next-hop internal load balancer.
    #[serde(default)]
    pub next_hop_ilb: Option<String>,
    /// Next-hop VPN tunnel link.
    #[serde(default)]
    pub next_hop_vpn_tunnel: Option<String>,
}

impl RouteDecl {
    /// Returns next-hop fields paired with their declared values.
    #[must_use]
    pub fn next_hops(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("next_hop_gateway", self.next_hop_gateway.as_deref()),
            ("next_hop_ip", self.next_hop_ip.as_deref()),
            ("next_hop_instance", self.next_hop_instance.as_deref()),
            ("next_hop_ilb", self.next_hop_ilb.as_deref()),
            ("next_hop_vpn_tunnel", self.next_hop_vpn_tunnel.as_deref()),
        ]
    }
}

/// Subnet flow-log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLogConfig {
    /// Aggregation interval label.
    #[serde(default)]
    pub aggregation_interval: Option<String>,
    /// Sampling rate in `0.0..=1.0`.
    #[serde(default)]
    pub flow_sampling: Option<f64>,
    /// Metadata mode.
    #[serde(default)]
    pub metadata: Option<String>,
    /// Custom metadata fields.
    #[serde(default)]
    pub metadata_fields: Vec<String>,
    /// Filter expression.
    #[serde(default)]
    pub filter_expr: Option<String>,
}

/// Typed provisioning inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInputs {
    /// Adapter used to read the snapshot.
    pub schema_version: SchemaVersion,
    /// Project identifier.
    pub project_id: String,
    /// Network name and resource name prefix.
    pub name: String,
    /// Network description.
    pub description: String,
    /// Regions in declaration order.
    pub regions: Vec<String>,
    /// Network self-link reported by the module.
    pub network_self_link: Option<String>,
    /// Network-wide options.
    pub options: NetworkOptions,
    /// CIDR allocation.
    pub cidrs: CidrConfig,
    /// NAT settings; `None` when NAT is disabled.
    pub nat: Option<NatConfig>,
    /// PSC settings; `None` when PSC is disabled.
    pub psc: Option<PscConfig>,
    /// User route declarations.
    pub routes: Vec<RouteDecl>,
    /// Resource labels.
    pub labels: BTreeMap<String, String>,
    /// Flow-log settings when configured.
    pub flow_logs: Option<FlowLogConfig>,
    /// Subnet outputs keyed by subnet name.
    pub subnets: BTreeMap<String, Value>,
    /// Subnet outputs keyed by region.
    pub subnets_by_region: BTreeMap<String, Value>,
}

impl ModuleInputs {
    /// Returns the PSC address when one is configured.
    #[must_use]
    pub fn psc_address(&self) -> Option<&str> {
        self.psc.as_ref().map(|psc| psc.address.as_str())
    }

    /// Returns the NAT tags, empty when NAT is disabled.
    #[must_use]
    pub fn nat_tags(&self) -> &[String] {
        self.nat.as_ref().map_or(&[], |nat| nat.tags.as_slice())
    }
}

// ============================================================================
// SECTION: Adapters
// ============================================================================

/// Reads the version-specific parts of a snapshot.
pub trait SchemaAdapter {
    /// Returns the layout this adapter reads.
    fn version(&self) -> SchemaVersion;

    /// Reads NAT settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the NAT settings are malformed.
    fn nat(
        &self,
        snapshot: &ConfigSnapshot,
        options: &Map<String, Value>,
    ) -> Result<Option<NatConfig>, ConfigError>;

    /// Reads PSC settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the PSC settings are malformed.
    fn psc(&self, snapshot: &ConfigSnapshot) -> Result<Option<PscConfig>, ConfigError>;
}

/// Adapter for snapshots with NAT flags in the options object.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Adapter;

impl SchemaAdapter for V1Adapter {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V1
    }

    fn nat(
        &self,
        _snapshot: &ConfigSnapshot,
        options: &Map<String, Value>,
    ) -> Result<Option<NatConfig>, ConfigError> {
        if !json_bool(options, KEY_OPTIONS, "nat")?.unwrap_or(false) {
            return Ok(None);
        }
        let logs = json_bool(options, KEY_OPTIONS, "nat_logs")?.unwrap_or(false);
        Ok(Some(NatConfig {
            tags: json_string_list(options, KEY_OPTIONS, "nat_tags")?,
            logging_filter: logs.then(|| DEFAULT_NAT_LOG_FILTER.to_string()),
        }))
    }

    fn psc(&self, _snapshot: &ConfigSnapshot) -> Result<Option<PscConfig>, ConfigError> {
        Ok(None)
    }
}

/// Adapter for snapshots with dedicated NAT and PSC outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Adapter;

impl SchemaAdapter for V2Adapter {
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V2
    }

    fn nat(
        &self,
        snapshot: &ConfigSnapshot,
        _options: &Map<String, Value>,
    ) -> Result<Option<NatConfig>, ConfigError> {
        let Some(nat) = optional_object(snapshot, KEY_NAT)? else {
            return Ok(None);
        };
        let logging_filter = json_string(&nat, KEY_NAT, "logging_filter")?
            .filter(|filter| !filter.is_empty());
        Ok(Some(NatConfig {
            tags: json_string_list(&nat, KEY_NAT, "tags")?,
            logging_filter,
        }))
    }

    fn psc(&self, snapshot: &ConfigSnapshot) -> Result<Option<PscConfig>, ConfigError> {
        let Some(psc) = optional_object(snapshot, KEY_PSC)? else {
            return Ok(None);
        };
        Ok(json_string(&psc, KEY_PSC, "address")?
            .filter(|address| !address.is_empty())
            .map(|address| PscConfig {
                address,
            }))
    }
}

/// Returns the adapter for a schema version.
#[must_use]
pub fn adapter_for(version: SchemaVersion) -> Box<dyn SchemaAdapter> {
    match version {
        SchemaVersion::V1 => Box::new(V1Adapter),
        SchemaVersion::V2 => Box::new(V2Adapter),
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns the key declarations for provisioning snapshots.
#[must_use]
pub fn snapshot_schema() -> SnapshotSchema {
    SnapshotSchema::new(vec![
        KeyDecl::required(KEY_PROJECT_ID, KeyKind::Scalar),
        KeyDecl::required(KEY_NAME, KeyKind::Scalar),
        KeyDecl::with_default(KEY_DESCRIPTION, KeyKind::Scalar, DEFAULT_DESCRIPTION),
        KeyDecl::required(KEY_REGIONS, KeyKind::List),
        KeyDecl::with_default(KEY_ROUTES, KeyKind::Json, "[]"),
        KeyDecl::with_default(KEY_LABELS, KeyKind::Json, "{}"),
        KeyDecl::optional(KEY_SELF_LINK, KeyKind::Scalar),
        KeyDecl::with_default(KEY_OPTIONS, KeyKind::Json, "{}"),
        KeyDecl::required(KEY_CIDRS, KeyKind::Json),
        KeyDecl::with_default(KEY_SUBNETS, KeyKind::Json, "{}"),
        KeyDecl::with_default(KEY_SUBNETS_BY_REGION, KeyKind::Json, "{}"),
        KeyDecl::optional(KEY_NAT, KeyKind::Json),
        KeyDecl::optional(KEY_PSC, KeyKind::Json),
        KeyDecl::optional(KEY_FLOW_LOGS, KeyKind::Json),
        KeyDecl::optional(KEY_SCHEMA_VERSION, KeyKind::Scalar),
    ])
}

/// Resolves the schema version for a snapshot.
///
/// A forced choice wins, then a pinned `schema_version` key, then detection.
///
/// # Errors
///
/// Returns [`ConfigError::Type`] when the pinned version is unknown.
pub fn resolve_version(
    snapshot: &ConfigSnapshot,
    choice: SchemaChoice,
) -> Result<SchemaVersion, ConfigError> {
    if let Some(version) = choice.pinned() {
        return Ok(version);
    }
    if let Some(label) = snapshot.scalar(KEY_SCHEMA_VERSION)? {
        return SchemaVersion::parse(label).ok_or_else(|| ConfigError::Type {
            key: KEY_SCHEMA_VERSION.to_string(),
            expected: "schema version (1 or 2)",
            value: label.to_string(),
        });
    }
    if snapshot.contains(KEY_NAT) || snapshot.contains(KEY_PSC) {
        return Ok(SchemaVersion::V2);
    }
    Ok(SchemaVersion::V1)
}

/// Adapts a snapshot into typed module inputs.
///
/// # Errors
///
/// Returns [`ConfigError`] when required data is absent or malformed.
pub fn adapt(snapshot: &ConfigSnapshot, choice: SchemaChoice) -> Result<ModuleInputs, ConfigError> {
    let version = resolve_version(snapshot, choice)?;
    let adapter = adapter_for(version);

    let project_id = non_empty(KEY_PROJECT_ID, snapshot.require_scalar(KEY_PROJECT_ID)?)?;
    let name = non_empty(KEY_NAME, snapshot.require_scalar(KEY_NAME)?)?;
    let description =
        snapshot.scalar(KEY_DESCRIPTION)?.unwrap_or(DEFAULT_DESCRIPTION).to_string();
    let regions = snapshot.list(KEY_REGIONS)?.unwrap_or_default();
    if regions.is_empty() {
        return Err(ConfigError::Invalid(format!("{KEY_REGIONS} must list at least one region")));
    }
    let network_self_link =
        snapshot.scalar(KEY_SELF_LINK)?.filter(|link| !link.is_empty()).map(str::to_string);

    let options_map = object_or_empty(snapshot, KEY_OPTIONS)?;
    let flow_logs = parse_flow_logs(snapshot)?;
    let options = parse_options(&options_map, flow_logs.is_some())?;
    let cidrs = parse_cidrs(&required_object(snapshot, KEY_CIDRS)?)?;
    let nat = adapter.nat(snapshot, &options_map)?;
    let psc = adapter.psc(snapshot)?;

    Ok(ModuleInputs {
        schema_version: adapter.version(),
        project_id,
        name,
        description,
        regions,
        network_self_link,
        options,
        cidrs,
        nat,
        psc,
        routes: parse_routes(snapshot)?,
        labels: parse_labels(snapshot)?,
        flow_logs,
        subnets: object_or_empty(snapshot, KEY_SUBNETS)?.into_iter().collect(),
        subnets_by_region: object_or_empty(snapshot, KEY_SUBNETS_BY_REGION)?
            .into_iter()
            .collect(),
    })
}

// ============================================================================
// SECTION: Section Parsers
// ============================================================================

/// Parses network options.
fn parse_options(
    options: &Map<String, Value>,
    flow_logs_configured: bool,
) -> Result<NetworkOptions, ConfigError> {
    let restricted_apis = match json_bool(options, KEY_OPTIONS, "restricted_apis")? {
        Some(flag) => flag,
        None => {
            json_bool(options, KEY_OPTIONS, "enable_restricted_apis_access")?.unwrap_or(false)
        }
    };
    let mtu = match json_integer(options, KEY_OPTIONS, "mtu")? {
        Some(mtu) => u32::try_from(mtu).map_err(|_| ConfigError::Type {
            key: format!("{KEY_OPTIONS}.mtu"),
            expected: "mtu",
            value: mtu.to_string(),
        })?,
        None => DEFAULT_MTU,
    };
    Ok(NetworkOptions {
        mtu,
        routing_mode: json_string(options, KEY_OPTIONS, "routing_mode")?
            .unwrap_or_else(|| DEFAULT_ROUTING_MODE.to_string()),
        delete_default_routes: json_bool(options, KEY_OPTIONS, "delete_default_routes")?
            .unwrap_or(false),
        restricted_apis,
        flow_logs: json_bool(options, KEY_OPTIONS, "flow_logs")?.unwrap_or(flow_logs_configured),
        ipv6_ula: json_bool(options, KEY_OPTIONS, "ipv6_ula")?.unwrap_or(false),
    })
}

/// Parses CIDR allocation settings.
fn parse_cidrs(cidrs: &Map<String, Value>) -> Result<CidrConfig, ConfigError> {
    let primary = json_string(cidrs, KEY_CIDRS, "primary")?
        .filter(|primary| !primary.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(format!("{KEY_CIDRS}.primary")))?;
    let primary_subnet_size = json_prefix(cidrs, KEY_CIDRS, "primary_subnet_size")?
        .ok_or_else(|| ConfigError::MissingKey(format!("{KEY_CIDRS}.primary_subnet_size")))?;
    let mut secondaries = BTreeMap::new();
    match cidrs.get("secondaries") {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (range_name, entry) in entries {
                let path = format!("{KEY_CIDRS}.secondaries.{range_name}");
                let Value::Object(entry) = entry else {
                    return Err(type_error(&path, "object", entry));
                };
                let cidr = json_string(entry, &path, "cidr")?
                    .ok_or_else(|| ConfigError::MissingKey(format!("{path}.cidr")))?;
                let subnet_size = json_prefix(entry, &path, "subnet_size")?
                    .ok_or_else(|| ConfigError::MissingKey(format!("{path}.subnet_size")))?;
                secondaries.insert(range_name.clone(), SecondaryRange {
                    cidr,
                    subnet_size,
                });
            }
        }
        Some(other) => {
            return Err(type_error(&format!("{KEY_CIDRS}.secondaries"), "object", other));
        }
    }
    Ok(CidrConfig {
        primary,
        primary_subnet_size,
        secondaries,
    })
}

/// Parses user route declarations.
fn parse_routes(snapshot: &ConfigSnapshot) -> Result<Vec<RouteDecl>, ConfigError> {
    match snapshot.json(KEY_ROUTES) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(|err| ConfigError::InvalidJson {
            key: KEY_ROUTES.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Parses resource labels.
fn parse_labels(snapshot: &ConfigSnapshot) -> Result<BTreeMap<String, String>, ConfigError> {
    object_or_empty(snapshot, KEY_LABELS)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            other => Err(type_error(&format!("{KEY_LABELS}.{key}"), "string", &other)),
        })
        .collect()
}

/// Parses flow-log settings; `null` and `{}` mean not configured.
fn parse_flow_logs(snapshot: &ConfigSnapshot) -> Result<Option<FlowLogConfig>, ConfigError> {
    let Some(settings) = optional_object(snapshot, KEY_FLOW_LOGS)? else {
        return Ok(None);
    };
    if settings.is_empty() {
        return Ok(None);
    }
    serde_json::from_value(Value::Object(settings)).map(Some).map_err(|err| {
        ConfigError::InvalidJson {
            key: KEY_FLOW_LOGS.to_string(),
            reason: err.to_string(),
        }
    })
}

// ============================================================================
// SECTION: JSON Helpers
// ============================================================================

/// Returns the JSON object under `key`, or `None` when absent or null.
fn optional_object(
    snapshot: &ConfigSnapshot,
    key: &str,
) -> Result<Option<Map<String, Value>>, ConfigError> {
    match snapshot.json(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(type_error(key, "object", &other)),
    }
}

/// Returns the JSON object under `key`, or an empty object when absent.
fn object_or_empty(snapshot: &ConfigSnapshot, key: &str) -> Result<Map<String, Value>, ConfigError> {
    Ok(optional_object(snapshot, key)?.unwrap_or_default())
}

/// Returns the JSON object under a required key.
fn required_object(snapshot: &ConfigSnapshot, key: &str) -> Result<Map<String, Value>, ConfigError> {
    optional_object(snapshot, key)?.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

/// Reads an optional boolean; strings are coerced.
fn json_bool(map: &Map<String, Value>, parent: &str, field: &str) -> Result<Option<bool>, ConfigError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(Value::String(text)) => parse_bool(text)
            .map(Some)
            .ok_or_else(|| type_error(&format!("{parent}.{field}"), "boolean", &Value::String(text.clone()))),
        Some(other) => Err(type_error(&format!("{parent}.{field}"), "boolean", other)),
    }
}

/// Reads an optional integer; strings are coerced.
fn json_integer(map: &Map<String, Value>, parent: &str, field: &str) -> Result<Option<i64>, ConfigError> {
    let path = format!("{parent}.{field}");
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => {
            number.as_i64().map(Some).ok_or_else(|| type_error(&path, "integer", &Value::Number(number.clone())))
        }
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| type_error(&path, "integer", &Value::String(text.clone()))),
        Some(other) => Err(type_error(&path, "integer", other)),
    }
}

/// Reads an optional prefix length in `0..=32`.
fn json_prefix(map: &Map<String, Value>, parent: &str, field: &str) -> Result<Option<u8>, ConfigError> {
    let Some(value) = json_integer(map, parent, field)? else {
        return Ok(None);
    };
    u8::try_from(value)
        .ok()
        .filter(|prefix| *prefix <= 32)
        .map(Some)
        .ok_or_else(|| ConfigError::Type {
            key: format!("{parent}.{field}"),
            expected: "prefix length (0-32)",
            value: value.to_string(),
        })
}

/// Reads an optional string.
fn json_string(map: &Map<String, Value>, parent: &str, field: &str) -> Result<Option<String>, ConfigError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(type_error(&format!("{parent}.{field}"), "string", other)),
    }
}

/// Reads an optional list of strings, empty when absent.
fn json_string_list(
    map: &Map<String, Value>,
    parent: &str,
    field: &str,
) -> Result<Vec<String>, ConfigError> {
    let path = format!("{parent}.{field}");
    match map.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| type_error(&path, "string list", item))
            })
            .collect(),
        Some(other) => Err(type_error(&path, "string list", other)),
    }
}

/// Rejects blank required scalars.
fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingKey(key.to_string()));
    }
    Ok(value.trim().to_string())
}

/// Builds a type error for a JSON value.
fn type_error(key: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::Type {
        key: key.to_string(),
        expected,
        value: value.to_string(),
    }
}

/// Returns the default user route priority.
const fn default_route_priority() -> u32 {
    DEFAULT_ROUTE_PRIORITY
}
