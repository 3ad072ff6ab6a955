// crates/vpc-assert-providers/src/gcp.rs
// ============================================================================
// Module: Compute Engine Resource Provider
// Description: Observed-state provider for the Compute Engine v1 REST API.
// Purpose: Read live VPC resources with bounded, authenticated requests.
// Dependencies: vpc-assert-config, vpc-assert-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The provider issues read-only GET requests against Compute Engine. Exact
//! names resolve with a single resource GET; everything else lists the
//! collection (regional or aggregated) and lets the engine filter locally.
//! Responses are size-limited, pages are capped, and camelCase keys are
//! normalized to snake case so records line up with expectation paths.
//!
//! Status mapping: 404 is zero matches, 401/403 is an authorization error,
//! 429 and 5xx are transient, and anything else non-2xx is invalid.
//! NAT gateways are not a Compute collection; they are flattened out of
//! their routers and tagged with the router name and region.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::io::Read;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde_json::Map;
use serde_json::Value;
use vpc_assert_config::GcpSettings;
use vpc_assert_core::ObservedResource;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::ResourceProvider;

// ============================================================================
// SECTION: Request Shapes
// ============================================================================

/// One read against the Compute API.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    /// Single resource GET.
    Get(String),
    /// Paged list of one regional or global collection.
    List(String),
    /// Paged aggregated list across regions.
    Aggregated {
        /// Aggregated list URL.
        url: String,
        /// Collection key inside each scope entry.
        collection: &'static str,
    },
}

// ============================================================================
// SECTION: Provider Implementation
// ============================================================================

/// Resource provider backed by the Compute Engine REST API.
pub struct GcpComputeProvider {
    /// Provider settings, including limits.
    settings: GcpSettings,
    /// Blocking HTTP client.
    client: Client,
    /// OAuth bearer token.
    token: String,
}

impl GcpComputeProvider {
    /// Creates a provider reading the bearer token from `settings.token_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Auth`] when the variable is unset or empty,
    /// and [`ProviderError::Unsupported`] when the HTTP client cannot be built.
    pub fn from_env(settings: GcpSettings) -> Result<Self, ProviderError> {
        let token = env::var(&settings.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Auth(format!(
                    "environment variable {} is not set",
                    settings.token_env
                ))
            })?;
        Self::with_token(settings, token)
    }

    /// Creates a provider with an explicit bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unsupported`] when the HTTP client cannot be built.
    pub fn with_token(
        settings: GcpSettings,
        token: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(settings.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| ProviderError::Unsupported("http client build failed".to_string()))?;
        Ok(Self {
            settings,
            client,
            token: token.into(),
        })
    }

    /// Builds the request answering `filter` for `class`.
    fn request_for(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Request, ProviderError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let project = url_segment("project", &filter.project)?;
        let name = match filter.name.as_ref().and_then(|name| name.exact()) {
            Some(name) if class != ResourceClass::NatGateway => Some(url_segment("name", name)?),
            _ => None,
        };
        let region = filter
            .region
            .as_deref()
            .map(|region| url_segment("region", last_segment(region)))
            .transpose()?;
        let (collection, name) = match class {
            ResourceClass::NatGateway => {
                let router = filter
                    .router
                    .as_deref()
                    .map(|router| url_segment("router", last_segment(router)))
                    .transpose()?;
                (ResourceClass::Router.collection(), router.filter(|_| region.is_some()))
            }
            other => (other.collection(), name),
        };
        let scope = if class.is_regional() {
            match &region {
                Some(region) => format!("{base}/projects/{project}/regions/{region}/{collection}"),
                None => {
                    return Ok(Request::Aggregated {
                        url: format!("{base}/projects/{project}/aggregated/{collection}"),
                        collection,
                    });
                }
            }
        } else {
            format!("{base}/projects/{project}/global/{collection}")
        };
        Ok(match name {
            Some(name) => Request::Get(format!("{scope}/{name}")),
            None => Request::List(scope),
        })
    }

    /// Executes a request and returns normalized raw records.
    fn execute(&self, request: &Request) -> Result<Vec<Value>, ProviderError> {
        let records = match request {
            Request::Get(url) => self.send(url, None)?.into_iter().collect(),
            Request::List(url) => self.paged(url, list_items)?,
            Request::Aggregated {
                url,
                collection,
            } => self.paged(url, |page| aggregated_items(page, collection))?,
        };
        Ok(records.into_iter().map(normalize_keys).collect())
    }

    /// Follows `nextPageToken` up to the configured page cap.
    fn paged<F>(&self, url: &str, mut extract: F) -> Result<Vec<Value>, ProviderError>
    where
        F: FnMut(&mut Map<String, Value>) -> Vec<Value>,
    {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        for _ in 0..self.settings.max_pages {
            let Some(page) = self.send(url, token.as_deref())? else {
                return Ok(records);
            };
            let Value::Object(mut page) = page else {
                return Err(ProviderError::Invalid("list response must be an object".to_string()));
            };
            records.extend(extract(&mut page));
            token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(ToString::to_string);
            if token.is_none() {
                return Ok(records);
            }
        }
        Err(ProviderError::Invalid(format!(
            "list exceeded {} pages",
            self.settings.max_pages
        )))
    }

    /// Sends one GET; `None` means the resource or collection does not exist.
    fn send(&self, url: &str, page_token: Option<&str>) -> Result<Option<Value>, ProviderError> {
        let mut url = Url::parse(url)
            .map_err(|_| ProviderError::Invalid(format!("invalid request url: {url}")))?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        let mut response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::Timeout(self.settings.timeout_ms)
                } else {
                    ProviderError::Transport("compute api request failed".to_string())
                }
            })?;
        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            404 => return Ok(None),
            401 | 403 => {
                return Err(ProviderError::Auth(format!("compute api returned status {status}")));
            }
            429 | 500..=599 => {
                return Err(ProviderError::Transport(format!(
                    "compute api returned status {status}"
                )));
            }
            _ => {
                return Err(ProviderError::Invalid(format!(
                    "compute api returned status {status}"
                )));
            }
        }
        let body = read_response_limited(&mut response, self.settings.max_response_bytes)?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|_| ProviderError::Invalid("compute api returned invalid json".to_string()))
    }
}

impl ResourceProvider for GcpComputeProvider {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        let request = self.request_for(class, filter)?;
        let raw = self.execute(&request)?;
        let records = if class == ResourceClass::NatGateway {
            raw.into_iter().flat_map(|router| flatten_nats(router, &filter.project)).collect()
        } else {
            raw
        };
        records
            .into_iter()
            .map(|record| {
                ObservedResource::from_value(class, record).ok_or_else(|| {
                    ProviderError::Invalid(format!("{class} record must be an object"))
                })
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Converts a camelCase API key to snake case (`IPAddress` becomes `ip_address`).
#[must_use]
pub fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (index, current) in chars.iter().copied().enumerate() {
        if !current.is_ascii_uppercase() {
            out.push(current);
            continue;
        }
        let previous = index.checked_sub(1).and_then(|prev| chars.get(prev)).copied();
        let next = chars.get(index + 1).copied();
        let boundary = previous.is_some_and(|previous| {
            previous.is_ascii_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_ascii_uppercase() && next.is_some_and(|next| next.is_ascii_lowercase()))
        });
        if boundary {
            out.push('_');
        }
        out.push(current.to_ascii_lowercase());
    }
    out
}

/// Recursively normalizes object keys; label maps keep user-defined keys.
#[must_use]
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = if key == "labels" { value } else { normalize_keys(value) };
                    (snake_case(&key), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Splits a normalized router record into NAT gateway records.
fn flatten_nats(router: Value, project: &str) -> Vec<Value> {
    let Value::Object(mut router) = router else {
        return Vec::new();
    };
    let Some(Value::Array(nats)) = router.remove("nats") else {
        return Vec::new();
    };
    let name = router.get("name").cloned().unwrap_or(Value::Null);
    let region = router.get("region").cloned().unwrap_or(Value::Null);
    let network = router.get("network").cloned().unwrap_or(Value::Null);
    nats.into_iter()
        .filter_map(|nat| match nat {
            Value::Object(mut nat) => {
                nat.insert("router".to_string(), name.clone());
                nat.insert("region".to_string(), region.clone());
                nat.insert("network".to_string(), network.clone());
                nat.entry("project").or_insert_with(|| Value::String(project.to_string()));
                Some(Value::Object(nat))
            }
            _ => None,
        })
        .collect()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Takes the `items` array out of a list page.
fn list_items(page: &mut Map<String, Value>) -> Vec<Value> {
    match page.remove("items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Takes every scope's `collection` array out of an aggregated list page.
fn aggregated_items(page: &mut Map<String, Value>, collection: &str) -> Vec<Value> {
    let Some(Value::Object(scopes)) = page.remove("items") else {
        return Vec::new();
    };
    scopes
        .into_iter()
        .filter_map(|(_, mut scope)| match scope.get_mut(collection).map(Value::take) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Returns the final path segment of a link or bare name.
fn last_segment(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Validates a value interpolated into a request path.
fn url_segment<'a>(label: &str, value: &'a str) -> Result<&'a str, ProviderError> {
    let valid = !value.is_empty()
        && value.len() <= 128
        && value.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':'));
    if valid {
        Ok(value)
    } else {
        Err(ProviderError::Invalid(format!("{label} is not a valid path segment: {value}")))
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ProviderError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| ProviderError::Invalid("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(ProviderError::Invalid("compute api response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|_| ProviderError::Transport("failed to read compute api response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(ProviderError::Invalid("compute api response exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
