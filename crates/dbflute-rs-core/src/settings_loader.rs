//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `DBFLUTE_IN_SCOPE_LIMIT` | `in_scope_limit` |
//! | `DBFLUTE_CHECK_INVALID_QUERY` | `check_invalid_query` |
//! | `DBFLUTE_ALLOW_EMPTY_STRING_QUERY` | `allow_empty_string_query` |
//! | `DBFLUTE_SAFETY_MAX_RESULT_SIZE` | `safety_max_result_size` |
//! | `DBFLUTE_COUNT_LATER` | `count_later` |
//! | `DBFLUTE_PAGING_RESELECT` | `paging_reselect` |
//! | `DBFLUTE_BIND_STYLE` | `bind_style` |
//! | `DBFLUTE_LOG_LEVEL` | `log_level` |
//! | `DBFLUTE_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use dbflute_rs_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/cbean.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::CBeanError;
use crate::settings::{BindStyle, CBeanSettings};

/// Loads settings from a TOML string, keeping defaults for absent keys.
pub fn from_toml_str(toml_str: &str) -> Result<CBeanSettings, CBeanError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| CBeanError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<CBeanSettings, CBeanError> {
    from_toml_str(&read_config_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<CBeanSettings, CBeanError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string, keeping defaults for absent keys.
pub fn from_json_str(json_str: &str) -> Result<CBeanSettings, CBeanError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| CBeanError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<CBeanSettings, CBeanError> {
    from_json_str(&read_config_file(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> CBeanSettings {
    let mut settings = CBeanSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `DBFLUTE_*` environment variable overrides.
///
/// Values that fail to parse are ignored and the previous value is kept.
pub fn apply_env_overrides(settings: &mut CBeanSettings) {
    if let Some(limit) = env_parse::<usize>("DBFLUTE_IN_SCOPE_LIMIT") {
        settings.in_scope_limit = limit;
    }
    if let Some(flag) = env_flag("DBFLUTE_CHECK_INVALID_QUERY") {
        settings.check_invalid_query = flag;
    }
    if let Some(flag) = env_flag("DBFLUTE_ALLOW_EMPTY_STRING_QUERY") {
        settings.allow_empty_string_query = flag;
    }
    if let Some(size) = env_parse::<usize>("DBFLUTE_SAFETY_MAX_RESULT_SIZE") {
        settings.safety_max_result_size = size;
    }
    if let Some(flag) = env_flag("DBFLUTE_COUNT_LATER") {
        settings.count_later = flag;
    }
    if let Some(flag) = env_flag("DBFLUTE_PAGING_RESELECT") {
        settings.paging_reselect = flag;
    }
    if let Some(style) = env_parse::<BindStyle>("DBFLUTE_BIND_STYLE") {
        settings.bind_style = style;
    }
    if let Ok(val) = std::env::var("DBFLUTE_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(flag) = env_flag("DBFLUTE_DEBUG") {
        settings.debug = flag;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config_file(path: &Path, format: &str) -> Result<String, CBeanError> {
    std::fs::read_to_string(path).map_err(|e| {
        CBeanError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<CBeanSettings, CBeanError> {
    let mut merged = serde_json::to_value(CBeanSettings::default()).map_err(|e| {
        CBeanError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;
    merge_json(&mut merged, value);
    serde_json::from_value(merged).map_err(|e| {
        CBeanError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Overlays `overlay` onto `base`, descending into objects present on both sides.
fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                merge_json(base_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}
