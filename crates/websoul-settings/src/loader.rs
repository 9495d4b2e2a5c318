//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WebsoulSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use websoul_core::LogFormat;

use crate::errors::{Result, SettingsError};
use crate::types::WebsoulSettings;

/// Env var naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "WEBSOUL_CONFIG";

/// Resolve the settings file path: `$WEBSOUL_CONFIG`, else `./websoul.json`.
pub fn settings_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from("websoul.json"), PathBuf::from)
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<WebsoulSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid merged value
/// is an error.
pub fn load_settings_from_path(path: &Path) -> Result<WebsoulSettings> {
    load_with(path, |name| std::env::var(name).ok())
}

/// Load settings reading overrides through `lookup` instead of the process
/// environment.
pub fn load_with<F>(path: &Path, lookup: F) -> Result<WebsoulSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(WebsoulSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: WebsoulSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, lookup);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(settings: &mut WebsoulSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Empty values are treated as unset. Values that fail to parse are logged
/// and ignored.
pub fn apply_overrides<F>(settings: &mut WebsoulSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Relay ───────────────────────────────────────────────────────
    if let Some(v) = env.u16("PORT", 0, 65535) {
        settings.relay.port = v;
    }
    if let Some(v) = env.string("HOST") {
        settings.relay.host = v;
    }
    if let Some(v) = env.string("SITE_ROOT") {
        settings.relay.site_root = v;
    }

    // ── SMTP ────────────────────────────────────────────────────────
    if let Some(v) = env.string("SMTP_HOST") {
        settings.smtp.host = v;
    }
    if let Some(v) = env.u16("SMTP_PORT", 1, 65535) {
        settings.smtp.port = v;
    }
    if let Some(v) = env.string("SMTP_SECURE") {
        // Only the exact string `true` enables implicit TLS.
        settings.smtp.secure = v == "true";
    }
    if let Some(v) = env.string("SMTP_USER") {
        settings.smtp.user = v;
    }
    if let Some(v) = env.string("SMTP_PASS") {
        settings.smtp.password = v;
    }
    if let Some(v) = env.string("SMTP_FROM") {
        settings.smtp.from = Some(v);
    }
    if let Some(v) = env.string("INQUIRY_TO") {
        settings.smtp.inquiry_to = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("WEBSOUL_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.string("WEBSOUL_LOG_FORMAT") {
        match LogFormat::from_name(&v) {
            Some(format) => settings.logging.format = format,
            None => warn!(key = "WEBSOUL_LOG_FORMAT", value = %v, "invalid log format env var, ignoring"),
        }
    }
}

/// Reject settings that would break the relay or page assembly.
pub fn validate(settings: &WebsoulSettings) -> Result<()> {
    let root = &settings.site.root_document;
    if root.is_empty() || root.contains('/') {
        return Err(SettingsError::invalid(
            "site.rootDocument",
            format!("must be a bare file name, got {root:?}"),
        ));
    }
    if !settings.smtp.inquiry_to.contains('@') {
        return Err(SettingsError::invalid(
            "smtp.inquiryTo",
            format!("must be an email address, got {:?}", settings.smtp.inquiry_to),
        ));
    }
    if settings.relay.max_body_bytes == 0 {
        return Err(SettingsError::invalid("relay.maxBodyBytes", "must be non-zero"));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within an inclusive range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = self.string(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid port env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_objects_recursively() {
        let target = json!({"smtp": {"host": "a", "port": 587}});
        let source = json!({"smtp": {"host": "b"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"smtp": {"host": "b", "port": 587}}));
    }

    #[test]
    fn merge_replaces_arrays() {
        let target = json!({"ids": ["header", "navMenu"]});
        let source = json!({"ids": ["header"]});
        assert_eq!(deep_merge(target, source), json!({"ids": ["header"]}));
    }

    #[test]
    fn merge_skips_nulls() {
        let target = json!({"port": 3000});
        let source = json!({"port": null});
        assert_eq!(deep_merge(target, source), json!({"port": 3000}));
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn u16_range() {
        assert_eq!(parse_u16_range("587", 1, 65535), Some(587));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("70000", 1, 65535), None);
        assert_eq!(parse_u16_range("abc", 1, 65535), None);
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn env_overrides_apply() {
        let mut settings = WebsoulSettings::default();
        apply_overrides(
            &mut settings,
            vars(&[
                ("PORT", "8080"),
                ("SMTP_HOST", "smtp.example.com"),
                ("SMTP_PORT", "465"),
                ("SMTP_SECURE", "true"),
                ("SMTP_USER", "relay@example.com"),
                ("SMTP_PASS", "secret"),
                ("SMTP_FROM", "noreply@example.com"),
                ("INQUIRY_TO", "sales@example.com"),
                ("WEBSOUL_LOG_FORMAT", "json"),
            ]),
        );
        assert_eq!(settings.relay.port, 8080);
        assert_eq!(settings.smtp.host, "smtp.example.com");
        assert_eq!(settings.smtp.port, 465);
        assert!(settings.smtp.secure);
        assert_eq!(settings.smtp.user, "relay@example.com");
        assert_eq!(settings.smtp.password, "secret");
        assert_eq!(settings.smtp.from.as_deref(), Some("noreply@example.com"));
        assert_eq!(settings.smtp.inquiry_to, "sales@example.com");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn secure_only_for_exact_true() {
        for value in ["1", "TRUE", "yes", "on", " true", "false"] {
            let mut settings = WebsoulSettings::default();
            settings.smtp.secure = true;
            apply_overrides(&mut settings, vars(&[("SMTP_SECURE", value)]));
            assert!(!settings.smtp.secure, "{value:?} must not enable TLS");
        }
        let mut settings = WebsoulSettings::default();
        apply_overrides(&mut settings, vars(&[("SMTP_SECURE", "true")]));
        assert!(settings.smtp.secure);
    }

    #[test]
    fn unset_secure_keeps_file_value() {
        let mut settings = WebsoulSettings::default();
        settings.smtp.secure = true;
        apply_overrides(&mut settings, vars(&[("SMTP_SECURE", "")]));
        assert!(settings.smtp.secure);
    }

    #[test]
    fn invalid_env_values_ignored() {
        let (logs, _guard) = websoul_core::capture_logs();
        let mut settings = WebsoulSettings::default();
        apply_overrides(
            &mut settings,
            vars(&[("SMTP_PORT", "not-a-port"), ("WEBSOUL_LOG_FORMAT", "xml")]),
        );
        assert_eq!(settings.smtp.port, 587);
        assert_eq!(settings.logging.format, LogFormat::Compact);
        assert!(logs.has_event(tracing::Level::WARN, "invalid port env var"));
        assert!(logs.has_event(tracing::Level::WARN, "invalid log format env var"));
    }

    #[test]
    fn empty_env_values_are_unset() {
        let mut settings = WebsoulSettings::default();
        apply_overrides(&mut settings, vars(&[("SMTP_FROM", ""), ("INQUIRY_TO", "")]));
        assert!(settings.smtp.from.is_none());
        assert_eq!(settings.smtp.inquiry_to, "support@websoul.co.kr");
    }

    // ── file loading ────────────────────────────────────────────────

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_with(&dir.path().join("absent.json"), |_| None).unwrap();
        assert_eq!(settings.relay.port, 3000);
    }

    #[test]
    fn file_then_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websoul.json");
        std::fs::write(
            &path,
            r#"{"relay": {"port": 4000, "siteRoot": "public"}, "smtp": {"host": "file.example.com"}}"#,
        )
        .unwrap();

        let settings = load_with(&path, vars(&[("SMTP_HOST", "env.example.com")])).unwrap();
        assert_eq!(settings.relay.port, 4000);
        assert_eq!(settings.relay.site_root, "public");
        assert_eq!(settings.smtp.host, "env.example.com");
        assert_eq!(settings.smtp.port, 587);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websoul.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_matches!(load_with(&path, |_| None), Err(SettingsError::Parse { .. }));
    }

    #[test]
    fn invalid_root_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websoul.json");
        std::fs::write(&path, r#"{"site": {"rootDocument": "pages/index.html"}}"#).unwrap();
        assert_matches!(
            load_with(&path, |_| None),
            Err(SettingsError::Invalid { field: "site.rootDocument", .. })
        );
    }

    #[test]
    fn invalid_inquiry_recipient_rejected() {
        let mut settings = WebsoulSettings::default();
        settings.smtp.inquiry_to = "support".into();
        assert_matches!(
            validate(&settings),
            Err(SettingsError::Invalid { field: "smtp.inquiryTo", .. })
        );
    }
}
