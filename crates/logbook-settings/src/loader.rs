//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LogbookSettings::default()`]
//! 2. If `~/.logbook/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `LOGBOOK_*` environment variable overrides (highest priority)
//! 4. Repair inconsistent values with [`LogbookSettings::validate`]
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::LogbookSettings;

/// Resolve the service home directory (`~/.logbook`).
pub fn logbook_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".logbook")
}

/// Resolve the path to the settings file (`~/.logbook/settings.json`).
pub fn settings_path() -> PathBuf {
    logbook_home().join("settings.json")
}

/// Resolve the configured database path against `~/.logbook`.
pub fn database_path(settings: &LogbookSettings) -> PathBuf {
    let configured = Path::new(&settings.database.path);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        logbook_home().join(configured)
    }
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LogbookSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LogbookSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

fn load_file_layer(path: &Path) -> Result<LogbookSettings> {
    let defaults = serde_json::to_value(LogbookSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `LOGBOOK_*` environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (file/default value stays).
pub fn apply_env_overrides(settings: &mut LogbookSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Split out from [`apply_env_overrides`] so tests never touch the real
/// process environment.
pub fn apply_overrides_from(
    settings: &mut LogbookSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let vars = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = vars.string("LOGBOOK_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = vars.parsed("LOGBOOK_PORT", |s| parse_u16_range(s, 1, 65535)) {
        settings.server.port = v;
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = vars.string("LOGBOOK_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = vars.parsed("LOGBOOK_DB_POOL_SIZE", |s| parse_u32_range(s, 1, 64)) {
        settings.database.pool_size = v;
    }

    // ── Queries ─────────────────────────────────────────────────────
    if let Some(v) = vars.parsed("LOGBOOK_SESSION_THRESHOLD_HOURS", |s| {
        parse_f64_range(s, 0.0, 8760.0).filter(|h| *h > 0.0)
    }) {
        settings.session.default_threshold_hours = v;
    }
    if let Some(v) = vars.parsed("LOGBOOK_HISTORY_MAX_LIMIT", |s| {
        parse_u32_range(s, 1, 100_000)
    }) {
        settings.history.max_limit = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = vars.string("LOGBOOK_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = vars.parsed("LOGBOOK_LOG_JSON", parse_bool) {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a finite `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Variable readers ────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let val = (self.lookup)(name)?;
        let result = parse(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn write_settings(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"server": {"port": 8001, "host": "0.0.0.0"}});
        let source = serde_json::json!({"server": {"port": 9090}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["server"]["port"], 9090);
        assert_eq!(merged["server"]["host"], "0.0.0.0");
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4, 5]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4, 5]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_new_keys_added() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        assert_eq!(deep_merge(target, source)["a"], 42);
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn missing_file_returns_defaults() {
        let settings = load_file_layer(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, LogbookSettings::default());
    }

    #[test]
    fn empty_json_returns_defaults() {
        let (_dir, path) = write_settings("{}");
        assert_eq!(load_file_layer(&path).unwrap(), LogbookSettings::default());
    }

    #[test]
    fn partial_json_overrides() {
        let (_dir, path) = write_settings(
            r#"{"server": {"port": 9090}, "session": {"defaultThresholdHours": 1.5}}"#,
        );
        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!((settings.session.default_threshold_hours - 1.5).abs() < f64::EPSILON);
        assert!((settings.session.max_threshold_hours - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_json_returns_error() {
        let (_dir, path) = write_settings("not valid json");
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::Json(_)
        ));
    }

    #[test]
    fn wrong_type_returns_error() {
        let (_dir, path) = write_settings(r#"{"server": {"port": "eighty"}}"#);
        assert!(matches!(
            load_file_layer(&path).unwrap_err(),
            SettingsError::Json(_)
        ));
    }

    #[test]
    fn loaded_settings_are_validated() {
        let (_dir, path) = write_settings(r#"{"history": {"defaultLimit": 5000}}"#);
        let settings = load_settings_from_path(&path).unwrap();
        assert!(settings.history.default_limit <= settings.history.max_limit);
    }

    // ── database_path ───────────────────────────────────────────────

    #[test]
    fn absolute_database_path_is_kept() {
        let mut settings = LogbookSettings::default();
        settings.database.path = "/var/lib/logbook/ledger.db".to_string();
        assert_eq!(
            database_path(&settings),
            PathBuf::from("/var/lib/logbook/ledger.db")
        );
    }

    #[test]
    fn relative_database_path_resolves_under_home() {
        let settings = LogbookSettings::default();
        let path = database_path(&settings);
        assert!(path.ends_with(".logbook/logbook.db"));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply_every_variable() {
        let mut settings = LogbookSettings::default();
        apply_overrides_from(
            &mut settings,
            vars(&[
                ("LOGBOOK_HOST", "127.0.0.1"),
                ("LOGBOOK_PORT", "9100"),
                ("LOGBOOK_DB_PATH", "/tmp/ledger.db"),
                ("LOGBOOK_DB_POOL_SIZE", "4"),
                ("LOGBOOK_SESSION_THRESHOLD_HOURS", "1.5"),
                ("LOGBOOK_HISTORY_MAX_LIMIT", "250"),
                ("LOGBOOK_LOG_LEVEL", "debug"),
                ("LOGBOOK_LOG_JSON", "yes"),
            ]),
        );
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.database.path, "/tmp/ledger.db");
        assert_eq!(settings.database.pool_size, 4);
        assert!((settings.session.default_threshold_hours - 1.5).abs() < f64::EPSILON);
        assert_eq!(settings.history.max_limit, 250);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = LogbookSettings::default();
        apply_overrides_from(
            &mut settings,
            vars(&[
                ("LOGBOOK_PORT", "0"),
                ("LOGBOOK_DB_POOL_SIZE", "many"),
                ("LOGBOOK_SESSION_THRESHOLD_HOURS", "-2"),
                ("LOGBOOK_LOG_JSON", "maybe"),
                ("LOGBOOK_HOST", ""),
            ]),
        );
        assert_eq!(settings, LogbookSettings::default());
    }

    #[test]
    fn no_overrides_keeps_settings() {
        let mut settings = LogbookSettings::default();
        apply_overrides_from(&mut settings, |_| None);
        assert_eq!(settings, LogbookSettings::default());
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in ["true", "1", "yes", "on", "TRUE", "On"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in ["false", "0", "no", "off", "FALSE"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn parse_u16_bounds() {
        assert_eq!(parse_u16_range("8001", 1, 65535), Some(8001));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("99999", 1, 65535), None);
        assert_eq!(parse_u16_range("port", 1, 65535), None);
    }

    #[test]
    fn parse_u32_bounds() {
        assert_eq!(parse_u32_range("64", 1, 64), Some(64));
        assert_eq!(parse_u32_range("65", 1, 64), None);
    }

    #[test]
    fn parse_f64_bounds() {
        assert_eq!(parse_f64_range("2.5", 0.0, 24.0), Some(2.5));
        assert_eq!(parse_f64_range(" 3 ", 0.0, 24.0), Some(3.0));
        assert_eq!(parse_f64_range("NaN", 0.0, 24.0), None);
        assert_eq!(parse_f64_range("inf", 0.0, 24.0), None);
        assert_eq!(parse_f64_range("25", 0.0, 24.0), None);
    }
}
