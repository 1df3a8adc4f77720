//! # jobflow-settings
//!
//! Configuration management with layered sources for jobflow.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`JobflowSettings::default()`]
//! 2. **Settings file**: `$JOBFLOW_SETTINGS` or `~/.jobflow/settings.json`
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `JOBFLOW_*` overrides (highest priority)
//!
//! Settings are plain values: callers load them once and hand the relevant
//! sections to the engine.
//!
//! # Usage
//!
//! ```no_run
//! use jobflow_settings::load_settings;
//!
//! let settings = load_settings();
//! println!("failure policy: {}", settings.evaluation.failure_policy);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    SETTINGS_PATH_ENV, apply_env_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;
