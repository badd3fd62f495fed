//! Tracing and logging setup shared by every process that embeds the ledger.

use serde::Deserialize;

/// Initialize process-wide logging with default settings.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&LoggingConfig::default());
}

/// Initialize process-wide logging from configuration.
pub fn init_with(config: &LoggingConfig) {
    tracing::init(config);
}

/// Logging settings (the `logging` section of the ledger configuration).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

/// Tracing configuration (filters, layers).
pub mod tracing;
