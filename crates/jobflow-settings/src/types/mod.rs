//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format. Each type implements [`Default`] with production default values
//! and is marked `#[serde(default)]`, so a partial file only overrides the
//! fields it names.

mod evaluation;

pub use evaluation::*;

use serde::{Deserialize, Serialize};

/// Root settings type for jobflow.
///
/// # JSON Format
///
/// ```json
/// {
///   "evaluation": { "failurePolicy": "abort" },
///   "logging": { "level": "debug", "json": true }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobflowSettings {
    /// How condition evaluation reacts to failing operations.
    pub evaluation: EvaluationSettings,
    /// Context serialization settings.
    pub context: ContextSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Context hand-off settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextSettings {
    /// Render context snapshots as indented JSON.
    pub pretty_json: bool,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive (e.g. `info`, `jobflow_engine=debug`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
