//! Settings error types.

use std::path::PathBuf;

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or does not match the schema.
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable override held an unusable value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Environment variable name.
        var: &'static str,
        /// Raw value that was rejected.
        value: String,
    },
}

/// Convenience alias for settings results.
pub type Result<T> = std::result::Result<T, SettingsError>;
