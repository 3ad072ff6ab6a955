// crates/vpc-assert-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for localization.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every user-facing CLI string lives in a small translation catalog and is
//! rendered through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example, `path`).
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "vpc-assert {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid (provider {provider}, {workers} workers)."),
    (
        "snapshot.path_missing",
        "No snapshot path: pass --snapshot or set snapshot.path in the config.",
    ),
    ("snapshot.load_failed", "Failed to load snapshot {path}: {error}"),
    (
        "snapshot.check.ok",
        "Snapshot valid: schema {version}, project {project}, network {network}, regions \
         {regions}.",
    ),
    ("snapshot.check.features", "Features: nat={nat} psc={psc} flow_logs={flow_logs}"),
    ("controls.invalid", "Invalid control selection: {error}"),
    ("plan.build_failed", "Failed to build expectations: {error}"),
    ("plan.header", "Evaluation plan: {controls} controls, {checks} checks"),
    ("plan.control", "{control}: {title}"),
    (
        "plan.resource",
        "  - {resource} ({class}) count {count}, {fields} field checks, {collections} \
         collection checks",
    ),
    ("plan.precomputed", "  - {findings} findings from the snapshot"),
    ("provider.init_failed", "Failed to initialize the {kind} provider: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("runtime.init_failed", "Failed to start the async runtime: {error}"),
    ("render.failed", "Failed to render output: {error}"),
    ("report.title", "VPC assertion report"),
    ("report.status", "Status: {status}"),
    ("report.summary", "{total} checks: {passed} passed, {failed} failed, {errored} errors"),
    ("report.controls", "Controls"),
    ("report.control.line", "  [{status}] {control}: {passed}/{total} passed"),
    ("report.problems", "Problems"),
    ("report.problems.none", "No problems found."),
    ("report.problem.line", "  [{verdict}] {control} {target}: {message}"),
    ("report.problem.values", "      expected {expected}, observed {observed}"),
    ("report.digest", "Digest: {algorithm}:{value}"),
    ("report.digest.unavailable", "Digest: unavailable"),
    ("report.column.control", "Control"),
    ("report.column.status", "Status"),
    ("report.column.passed", "Passed"),
    ("report.column.failed", "Failed"),
    ("report.column.errored", "Errors"),
    ("report.column.resource", "Resource"),
    ("report.column.verdict", "Verdict"),
    ("report.column.expected", "Expected"),
    ("report.column.observed", "Observed"),
    ("report.column.message", "Message"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "vpc-assert {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    (
        "config.validate.ok",
        "Configuració vàlida (proveïdor {provider}, {workers} treballadors).",
    ),
    (
        "snapshot.path_missing",
        "Cap camí d'instantània: passeu --snapshot o definiu snapshot.path a la configuració.",
    ),
    ("snapshot.load_failed", "No s'ha pogut carregar la instantània {path}: {error}"),
    (
        "snapshot.check.ok",
        "Instantània vàlida: esquema {version}, projecte {project}, xarxa {network}, regions \
         {regions}.",
    ),
    ("snapshot.check.features", "Funcions: nat={nat} psc={psc} flow_logs={flow_logs}"),
    ("controls.invalid", "Selecció de controls no vàlida: {error}"),
    ("plan.build_failed", "No s'han pogut construir les expectatives: {error}"),
    ("plan.header", "Pla d'avaluació: {controls} controls, {checks} comprovacions"),
    ("plan.control", "{control}: {title}"),
    (
        "plan.resource",
        "  - {resource} ({class}) recompte {count}, {fields} comprovacions de camp, \
         {collections} comprovacions de col·lecció",
    ),
    ("plan.precomputed", "  - {findings} resultats de la instantània"),
    ("provider.init_failed", "No s'ha pogut inicialitzar el proveïdor {kind}: {error}"),
    ("audit.open_failed", "No s'ha pogut obrir el registre d'auditoria {path}: {error}"),
    ("runtime.init_failed", "No s'ha pogut iniciar l'entorn asíncron: {error}"),
    ("render.failed", "No s'ha pogut generar la sortida: {error}"),
    ("report.title", "Informe d'asserció de VPC"),
    ("report.status", "Estat: {status}"),
    (
        "report.summary",
        "{total} comprovacions: {passed} correctes, {failed} fallades, {errored} errors",
    ),
    ("report.controls", "Controls"),
    ("report.control.line", "  [{status}] {control}: {passed}/{total} correctes"),
    ("report.problems", "Problemes"),
    ("report.problems.none", "No s'han trobat problemes."),
    ("report.problem.line", "  [{verdict}] {control} {target}: {message}"),
    ("report.problem.values", "      esperat {expected}, observat {observed}"),
    ("report.digest", "Resum: {algorithm}:{value}"),
    ("report.digest.unavailable", "Resum: no disponible"),
    ("report.column.control", "Control"),
    ("report.column.status", "Estat"),
    ("report.column.passed", "Correctes"),
    ("report.column.failed", "Fallades"),
    ("report.column.errored", "Errors"),
    ("report.column.resource", "Recurs"),
    ("report.column.verdict", "Veredicte"),
    ("report.column.expected", "Esperat"),
    ("report.column.observed", "Observat"),
    ("report.column.message", "Missatge"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(current_locale())
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
