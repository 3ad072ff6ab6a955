// crates/vpc-assert-providers/src/fixture.rs
// ============================================================================
// Module: Fixture Resource Provider
// Description: Observed-state provider backed by a JSON or YAML document.
// Purpose: Evaluate controls offline against recorded infrastructure state.
// Dependencies: vpc-assert-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! A fixture document is an object keyed by collection name (`networks`,
//! `subnetworks`, `routers`, `nats`, `routes`, `global_addresses`,
//! `forwarding_rules`), each holding an array of snake-case resource records.
//! The document is read once, with a size limit, and validated strictly:
//! unknown collections and non-object records are rejected. NAT records
//! without a `network` take the network of the router they name, as live
//! NATs do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use vpc_assert_core::ObservedResource;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::ResourceProvider;
use vpc_assert_core::resource::same_link;

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Returns the fixture document key holding records of `class`.
#[must_use]
pub const fn fixture_key(class: ResourceClass) -> &'static str {
    match class {
        ResourceClass::Network => "networks",
        ResourceClass::Subnetwork => "subnetworks",
        ResourceClass::Router => "routers",
        ResourceClass::NatGateway => "nats",
        ResourceClass::Route => "routes",
        ResourceClass::GlobalAddress => "global_addresses",
        ResourceClass::ForwardingRule => "forwarding_rules",
    }
}

/// Resolves a fixture document key back to its class.
fn class_for_key(key: &str) -> Option<ResourceClass> {
    ResourceClass::ALL.into_iter().find(|class| fixture_key(*class) == key)
}

// ============================================================================
// SECTION: Provider Implementation
// ============================================================================

/// Resource provider answering from an in-memory fixture document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureProvider {
    /// Records grouped by class, in document order.
    records: BTreeMap<ResourceClass, Vec<ObservedResource>>,
}

impl FixtureProvider {
    /// Loads a fixture document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Invalid`] when the file cannot be read, is too
    /// large, or is not a valid fixture document.
    pub fn load(path: &Path, max_bytes: usize) -> Result<Self, ProviderError> {
        let bytes = read_file_limited(path, max_bytes)?;
        let document = parse_document(path, &bytes)?;
        Self::from_value(document)
    }

    /// Builds a provider from an already parsed fixture document.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Invalid`] when the document shape is wrong.
    pub fn from_value(document: Value) -> Result<Self, ProviderError> {
        let Value::Object(collections) = document else {
            return Err(ProviderError::Invalid("fixture must be an object".to_string()));
        };
        let mut records = BTreeMap::new();
        for (key, entries) in collections {
            let class = class_for_key(&key).ok_or_else(|| {
                ProviderError::Invalid(format!("unknown fixture collection: {key}"))
            })?;
            let Value::Array(entries) = entries else {
                return Err(ProviderError::Invalid(format!(
                    "fixture collection {key} must be an array"
                )));
            };
            let mut parsed = Vec::with_capacity(entries.len());
            for (index, entry) in entries.into_iter().enumerate() {
                let record = ObservedResource::from_value(class, entry).ok_or_else(|| {
                    ProviderError::Invalid(format!("fixture record {key}[{index}] must be an object"))
                })?;
                parsed.push(record);
            }
            records.insert(class, parsed);
        }
        attach_router_networks(&mut records);
        Ok(Self {
            records,
        })
    }

    /// Returns the number of records held for `class`.
    #[must_use]
    pub fn count(&self, class: ResourceClass) -> usize {
        self.records.get(&class).map_or(0, Vec::len)
    }
}

impl ResourceProvider for FixtureProvider {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        let Some(records) = self.records.get(&class) else {
            return Ok(Vec::new());
        };
        Ok(records.iter().filter(|record| filter.matches(record)).cloned().collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Copies each router's network onto NAT records that name the router.
fn attach_router_networks(records: &mut BTreeMap<ResourceClass, Vec<ObservedResource>>) {
    let routers: Vec<ObservedResource> =
        records.get(&ResourceClass::Router).cloned().unwrap_or_default();
    let Some(nats) = records.get_mut(&ResourceClass::NatGateway) else {
        return;
    };
    for nat in nats.iter_mut().filter(|nat| !nat.fields.contains_key("network")) {
        let Some(router_name) = nat.field("router").and_then(Value::as_str) else {
            continue;
        };
        let region = nat.field("region").and_then(Value::as_str);
        let owner = routers.iter().find(|router| {
            router.name().is_some_and(|name| same_link(name, router_name))
                && region.is_none_or(|region| {
                    router
                        .field("region")
                        .and_then(Value::as_str)
                        .is_none_or(|router_region| same_link(router_region, region))
                })
        });
        if let Some(network) = owner.and_then(|router| router.field("network")).cloned() {
            nat.fields.insert("network".to_string(), network);
        }
    }
}

/// Reads a file while enforcing a byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ProviderError> {
    let file = File::open(path)
        .map_err(|err| ProviderError::Invalid(format!("unable to open fixture: {err}")))?;
    let limit = u64::try_from(max_bytes)
        .map_err(|_| ProviderError::Invalid("fixture size limit exceeds u64".to_string()))?
        .saturating_add(1);
    let mut buf = Vec::new();
    file.take(limit)
        .read_to_end(&mut buf)
        .map_err(|err| ProviderError::Invalid(format!("unable to read fixture: {err}")))?;
    if buf.len() > max_bytes {
        return Err(ProviderError::Invalid("fixture exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Parses JSON or YAML content based on the file extension.
fn parse_document(path: &Path, bytes: &[u8]) -> Result<Value, ProviderError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ProviderError::Invalid("fixture must be utf-8".to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(text)
            .map_err(|err| ProviderError::Invalid(format!("invalid fixture yaml: {err}")))
    } else {
        serde_json::from_str(text)
            .map_err(|err| ProviderError::Invalid(format!("invalid fixture json: {err}")))
    }
}
