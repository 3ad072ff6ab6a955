// crates/vpc-assert-config/src/snapshot.rs
// ============================================================================
// Module: VPC Assert Config Snapshot
// Description: Typed key/value snapshot of provisioning inputs and outputs.
// Purpose: Parse a flat string map into scalars, lists, and JSON trees once per run.
// Dependencies: serde, serde_json, serde_yaml, crate::config
// ============================================================================

//! ## Overview
//! Provisioning tools hand over a flat map of strings. Each key is declared
//! with a [`KeyKind`] and a [`Requirement`]; [`load`] parses declared values
//! accordingly and infers a kind for undeclared ones. The resulting
//! [`ConfigSnapshot`] is immutable and offers typed accessors that coerce
//! booleans and integers.
//!
//! List values are tolerant of the shapes tools emit: `["a", "b"]`,
//! `[\"a\",\"b\"]`, and `a, b` all yield `a`, `b`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum snapshot document size in bytes.
pub const MAX_SNAPSHOT_FILE_SIZE: usize = 4 * 1024 * 1024;

/// Keys allowed inside a `tofu output -json` entry.
const OUTPUT_ENVELOPE_KEYS: [&str; 3] = ["value", "type", "sensitive"];

// ============================================================================
// SECTION: Values
// ============================================================================

/// Parsed snapshot value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Plain string.
    Scalar(String),
    /// Ordered list of strings.
    List(Vec<String>),
    /// Nested JSON structure.
    Json(Value),
}

/// Declared kind of a snapshot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Plain string.
    Scalar,
    /// Comma-separated or bracketed list.
    List,
    /// JSON document.
    Json,
}

/// Presence requirement of a snapshot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Key must be present.
    Required,
    /// Key may be absent.
    Optional,
    /// Key falls back to the raw text when absent.
    Default(&'static str),
}

/// Declaration of one snapshot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDecl {
    /// Snapshot key.
    pub key: &'static str,
    /// Declared kind.
    pub kind: KeyKind,
    /// Presence requirement.
    pub requirement: Requirement,
}

impl KeyDecl {
    /// Declares a required key.
    #[must_use]
    pub const fn required(key: &'static str, kind: KeyKind) -> Self {
        Self {
            key,
            kind,
            requirement: Requirement::Required,
        }
    }

    /// Declares an optional key.
    #[must_use]
    pub const fn optional(key: &'static str, kind: KeyKind) -> Self {
        Self {
            key,
            kind,
            requirement: Requirement::Optional,
        }
    }

    /// Declares a key with a default raw value.
    #[must_use]
    pub const fn with_default(key: &'static str, kind: KeyKind, default: &'static str) -> Self {
        Self {
            key,
            kind,
            requirement: Requirement::Default(default),
        }
    }
}

/// Ordered set of key declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotSchema {
    /// Declarations in declaration order.
    decls: Vec<KeyDecl>,
}

impl SnapshotSchema {
    /// Creates a schema from declarations.
    #[must_use]
    pub const fn new(decls: Vec<KeyDecl>) -> Self {
        Self {
            decls,
        }
    }

    /// Returns the declaration for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KeyDecl> {
        self.decls.iter().find(|decl| decl.key == key)
    }

    /// Iterates declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyDecl> {
        self.decls.iter()
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable typed snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    /// Parsed values by key.
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns a scalar value as text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Type`] when the value is a list or a JSON structure.
    pub fn scalar(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Scalar(text)) => Ok(Some(text)),
            Some(ConfigValue::Json(Value::String(text))) => Ok(Some(text)),
            Some(other) => Err(type_error(key, "string", other)),
        }
    }

    /// Returns a scalar value, failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when absent or [`ConfigError::Type`]
    /// when the value is not a string.
    pub fn require_scalar(&self, key: &str) -> Result<&str, ConfigError> {
        self.scalar(key)?.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Returns a value coerced to a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Type`] when the value is not boolean-like.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Json(Value::Bool(flag))) => Ok(Some(*flag)),
            Some(ConfigValue::Scalar(text)) => {
                parse_bool(text).map(Some).ok_or_else(|| ConfigError::Type {
                    key: key.to_string(),
                    expected: "boolean",
                    value: text.clone(),
                })
            }
            Some(other) => Err(type_error(key, "boolean", other)),
        }
    }

    /// Returns a value coerced to an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Type`] when the value is not an integer.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Json(Value::Number(number))) => number
                .as_i64()
                .map(Some)
                .ok_or_else(|| type_error(key, "integer", &ConfigValue::Json(Value::Number(number.clone())))),
            Some(ConfigValue::Scalar(text)) => {
                text.trim().parse::<i64>().map(Some).map_err(|_| ConfigError::Type {
                    key: key.to_string(),
                    expected: "integer",
                    value: text.clone(),
                })
            }
            Some(other) => Err(type_error(key, "integer", other)),
        }
    }

    /// Returns a value as a list of strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Type`] when a JSON value is not an array of strings.
    pub fn list(&self, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::List(items)) => Ok(Some(items.clone())),
            Some(ConfigValue::Scalar(text)) => Ok(Some(parse_list(text))),
            Some(ConfigValue::Json(Value::Array(items))) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| type_error(key, "string list", &ConfigValue::Json(item.clone())))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(type_error(key, "string list", other)),
        }
    }

    /// Returns a value as a JSON tree.
    ///
    /// Scalars are returned as JSON strings and lists as arrays.
    #[must_use]
    pub fn json(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|value| match value {
            ConfigValue::Json(json) => json.clone(),
            ConfigValue::Scalar(text) => Value::String(text.clone()),
            ConfigValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        })
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Parses a raw string map into a typed snapshot.
///
/// # Errors
///
/// Returns [`ConfigError::MissingKey`] for absent required keys and
/// [`ConfigError::InvalidJson`] for JSON-declared values that do not parse.
pub fn load(
    raw: &BTreeMap<String, String>,
    schema: &SnapshotSchema,
) -> Result<ConfigSnapshot, ConfigError> {
    let mut values = BTreeMap::new();
    for decl in schema.iter() {
        let text = match (raw.get(decl.key), &decl.requirement) {
            (Some(text), _) => text.as_str(),
            (None, Requirement::Default(default)) => default,
            (None, Requirement::Optional) => continue,
            (None, Requirement::Required) => {
                return Err(ConfigError::MissingKey(decl.key.to_string()));
            }
        };
        values.insert(decl.key.to_string(), parse_declared(decl, text)?);
    }
    for (key, text) in raw {
        if schema.get(key).is_none() {
            values.insert(key.clone(), infer_value(text));
        }
    }
    Ok(ConfigSnapshot {
        values,
    })
}

/// Reads a JSON or YAML snapshot document into a raw string map.
///
/// Accepts a flat object or the `tofu output -json` shape where every entry
/// wraps its value as `{"value": ...}`. Non-string values are stored as JSON
/// text.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, exceeds the size
/// limit, or is not an object.
pub fn load_raw_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let bytes = read_file_limited(path, MAX_SNAPSHOT_FILE_SIZE)?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("snapshot file must be utf-8".to_string()))?;
    let document = parse_document(path, content)?;
    raw_from_document(document)
}

/// Flattens a parsed snapshot document into a raw string map.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the document is not an object.
pub fn raw_from_document(document: Value) -> Result<BTreeMap<String, String>, ConfigError> {
    let Value::Object(entries) = document else {
        return Err(ConfigError::Invalid("snapshot document must be an object".to_string()));
    };
    let mut raw = BTreeMap::new();
    for (key, value) in entries {
        let value = unwrap_output_envelope(value);
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        raw.insert(key, text);
    }
    Ok(raw)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a declared value according to its kind.
fn parse_declared(decl: &KeyDecl, text: &str) -> Result<ConfigValue, ConfigError> {
    match decl.kind {
        KeyKind::Scalar => Ok(ConfigValue::Scalar(text.trim().to_string())),
        KeyKind::List => Ok(ConfigValue::List(parse_list(text))),
        KeyKind::Json => serde_json::from_str(text).map(ConfigValue::Json).map_err(|err| {
            ConfigError::InvalidJson {
                key: decl.key.to_string(),
                reason: err.to_string(),
            }
        }),
    }
}

/// Infers the kind of an undeclared value.
fn infer_value(text: &str) -> ConfigValue {
    let trimmed = text.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && let Ok(value) = serde_json::from_str::<Value>(text)
    {
        return ConfigValue::Json(value);
    }
    ConfigValue::Scalar(text.to_string())
}

/// Splits a tolerant list representation into items.
#[must_use]
pub fn parse_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(|item| item.trim().replace("\\\"", "\"").trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parses a boolean-like string.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builds a type error for a stored value.
fn type_error(key: &str, expected: &'static str, value: &ConfigValue) -> ConfigError {
    let rendered = match value {
        ConfigValue::Scalar(text) => text.clone(),
        ConfigValue::List(items) => items.join(","),
        ConfigValue::Json(json) => json.to_string(),
    };
    ConfigError::Type {
        key: key.to_string(),
        expected,
        value: rendered,
    }
}

/// Unwraps a `{"value": ...}` output envelope.
fn unwrap_output_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("value")
                && map.keys().all(|key| OUTPUT_ENVELOPE_KEYS.contains(&key.as_str())) =>
        {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Reads a file with a hard size limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ConfigError> {
    let file = File::open(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let limit = u64::try_from(max_bytes.saturating_add(1))
        .map_err(|_| ConfigError::Invalid("snapshot size limit exceeds u64".to_string()))?;
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf).map_err(|err| ConfigError::Io(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(ConfigError::Invalid("snapshot file exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Parses a JSON or YAML document based on the file extension.
fn parse_document(path: &Path, content: &str) -> Result<Value, ConfigError> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
        return serde_yaml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()));
    }
    serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
