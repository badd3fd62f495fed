//! Ledger configuration.
//!
//! Values are layered:
//! 1. Defaults in code
//! 2. Environment overrides with the `DRUGGIST__` prefix, `__` separating
//!    sections (`DRUGGIST__REPORTS__EXPIRY_WINDOW_DAYS=14`)

use anyhow::Context;
use config::Environment;
use rust_decimal::Decimal;
use serde::Deserialize;

use druggist_observability::LoggingConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub reports: ReportConfig,
    pub logging: LoggingConfig,
}

/// Dashboard and report thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Items expiring within this many days count as "expiring soon".
    pub expiry_window_days: u32,

    /// Items at or below this stock count as "near empty".
    pub near_empty_threshold: u32,

    /// Number of best-selling items on the dashboard.
    pub top_sellers: usize,
}

impl ReportConfig {
    pub fn near_empty_threshold(&self) -> Decimal {
        Decimal::from(self.near_empty_threshold)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            expiry_window_days: 10,
            near_empty_threshold: 5,
            top_sellers: 5,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from defaults and `DRUGGIST__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Environment::with_prefix("DRUGGIST"))
    }

    /// Load configuration with an explicit environment source.
    ///
    /// The separator and parsing options are applied here; callers only choose
    /// the prefix and, in tests, the variables themselves.
    pub fn load_from(environment: Environment) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = config::Config::builder()
            .set_default(
                "reports.expiry_window_days",
                i64::from(defaults.reports.expiry_window_days),
            )?
            .set_default(
                "reports.near_empty_threshold",
                i64::from(defaults.reports.near_empty_threshold),
            )?
            .set_default("reports.top_sellers", defaults.reports.top_sellers as i64)?
            .set_default("logging.filter", defaults.logging.filter.clone())?
            .set_default("logging.json", defaults.logging.json)?
            .add_source(environment.separator("__").try_parsing(true))
            .build()
            .context("failed to build ledger configuration")?;

        config
            .try_deserialize()
            .context("invalid ledger configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("DRUGGIST").source(Some(map))
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = LedgerConfig::load_from(env(&[])).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.reports.expiry_window_days, 10);
        assert_eq!(config.reports.near_empty_threshold(), Decimal::from(5));
        assert!(config.logging.json);
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let config = LedgerConfig::load_from(env(&[
            ("DRUGGIST__REPORTS__EXPIRY_WINDOW_DAYS", "14"),
            ("DRUGGIST__REPORTS__TOP_SELLERS", "3"),
            ("DRUGGIST__LOGGING__JSON", "false"),
        ]))
        .unwrap();

        assert_eq!(config.reports.expiry_window_days, 14);
        assert_eq!(config.reports.top_sellers, 3);
        assert_eq!(config.reports.near_empty_threshold, 5);
        assert!(!config.logging.json);
    }

    #[test]
    fn malformed_value_is_rejected() {
        let result = LedgerConfig::load_from(env(&[(
            "DRUGGIST__REPORTS__EXPIRY_WINDOW_DAYS",
            "soon",
        )]));
        assert!(result.is_err());
    }
}
