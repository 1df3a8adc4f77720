//! Layered settings loading.
//!
//! Layers, lowest priority first:
//! 1. Compiled defaults ([`JobflowSettings::default()`])
//! 2. The JSON settings file, deep-merged over the defaults
//! 3. `JOBFLOW_*` environment variables

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{Result, SettingsError};
use crate::types::{FailurePolicy, JobflowSettings};

/// Environment variable naming an explicit settings file.
pub const SETTINGS_PATH_ENV: &str = "JOBFLOW_SETTINGS";

const ENV_FAILURE_POLICY: &str = "JOBFLOW_FAILURE_POLICY";
const ENV_VALIDATE_JOBS: &str = "JOBFLOW_VALIDATE_JOBS";
const ENV_PRETTY_CONTEXT: &str = "JOBFLOW_PRETTY_CONTEXT";
const ENV_LOG_LEVEL: &str = "JOBFLOW_LOG_LEVEL";
const ENV_LOG_JSON: &str = "JOBFLOW_LOG_JSON";

/// Resolve the settings file location.
///
/// `$JOBFLOW_SETTINGS` wins; otherwise `~/.jobflow/settings.json`.
pub fn settings_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(SETTINGS_PATH_ENV)
        && !explicit.is_empty()
    {
        return PathBuf::from(explicit);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".jobflow").join("settings.json")
}

/// Load settings from the default location.
///
/// Never fails: an unreadable or malformed file is logged and replaced by
/// compiled defaults (environment overrides still apply).
pub fn load_settings() -> JobflowSettings {
    let path = settings_path();
    match load_settings_from_path(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to load settings, using defaults");
            let mut settings = JobflowSettings::default();
            if let Err(e) = apply_env_overrides(&mut settings, |name| std::env::var(name).ok()) {
                tracing::warn!(error = %e, "ignoring environment overrides");
            }
            settings
        }
    }
}

/// Load settings from a specific file, then apply process environment overrides.
///
/// A missing file is not an error; it contributes nothing.
pub fn load_settings_from_path(path: &Path) -> Result<JobflowSettings> {
    let mut settings = read_file_layer(path)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    tracing::info!(?path, policy = %settings.evaluation.failure_policy, "settings loaded");
    Ok(settings)
}

fn read_file_layer(path: &Path) -> Result<JobflowSettings> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(JobflowSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let user: Value = serde_json::from_str(&raw)?;
    let defaults = serde_json::to_value(JobflowSettings::default())?;
    Ok(serde_json::from_value(deep_merge(defaults, user))?)
}

/// Apply `JOBFLOW_*` overrides read through `lookup`.
///
/// Taking the lookup as a closure keeps the process environment out of
/// tests.
pub fn apply_env_overrides<F>(settings: &mut JobflowSettings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_FAILURE_POLICY) {
        settings.evaluation.failure_policy =
            FailurePolicy::parse(&raw).ok_or(SettingsError::InvalidEnv {
                var: ENV_FAILURE_POLICY,
                value: raw,
            })?;
    }
    if let Some(raw) = lookup(ENV_VALIDATE_JOBS) {
        settings.evaluation.validate_jobs = parse_bool(ENV_VALIDATE_JOBS, raw)?;
    }
    if let Some(raw) = lookup(ENV_PRETTY_CONTEXT) {
        settings.context.pretty_json = parse_bool(ENV_PRETTY_CONTEXT, raw)?;
    }
    if let Some(raw) = lookup(ENV_LOG_LEVEL)
        && !raw.trim().is_empty()
    {
        settings.logging.level = raw.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_LOG_JSON) {
        settings.logging.json = parse_bool(ENV_LOG_JSON, raw)?;
    }
    Ok(())
}

fn parse_bool(var: &'static str, raw: String) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidEnv { var, value: raw }),
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
