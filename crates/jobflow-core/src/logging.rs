//! Tracing subscriber setup.

use jobflow_settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `settings.level` when it parses. Returns `false` if
/// a global subscriber was already installed (repeat calls are harmless).
pub fn init_logging(settings: &LoggingSettings) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
