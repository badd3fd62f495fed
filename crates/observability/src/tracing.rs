//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
