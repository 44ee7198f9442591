//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; secrets (exchange and search
//! credentials) are only ever read from the environment.
//!
//! # Example
//!
//! ```no_run
//! use livebook::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::schedule::ScheduleConfig;
use super::sinks::SinksConfig;
use super::tracking::{BufferConfig, TrackingConfig, MAX_LOOKAHEAD_MINUTES};
use crate::adapter::outbound::betfair::BetfairConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults. Load from a
/// TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Exchange endpoints and client certificate.
    #[serde(default)]
    pub exchange: BetfairConfig,

    /// Admission limits and discovery filters.
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Polling loop timing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Pending-write buffer limits.
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Persistence sinks.
    #[serde(default)]
    pub sinks: SinksConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Search credentials are taken from `ELASTIC_USERNAME` and
    /// `ELASTIC_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if config.sinks.search.enabled {
            config.sinks.search.load_credentials_from_env();
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }

        if self.exchange.identity_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "identity_url",
            }
            .into());
        }
        if self.exchange.api_url.is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if !self.exchange.api_url.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                reason: "must end with '/'".to_string(),
            }
            .into());
        }

        let tracking = &self.tracking;
        if tracking.max_slots == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_slots",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if tracking.max_request_event_ids == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_request_event_ids",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if tracking.max_catalogue_results == 0 || tracking.max_catalogue_results > 1000 {
            return Err(ConfigError::InvalidValue {
                field: "max_catalogue_results",
                reason: "must be between 1 and 1000".to_string(),
            }
            .into());
        }
        if tracking.min_traded_volume < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_traded_volume",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if tracking.lookahead_minutes <= 0 || tracking.lookahead_minutes > MAX_LOOKAHEAD_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "lookahead_minutes",
                reason: format!("must be between 1 and {MAX_LOOKAHEAD_MINUTES}"),
            }
            .into());
        }
        if tracking.event_type_id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "event_type_id",
            }
            .into());
        }
        if tracking.market_type_codes.is_empty() {
            return Err(ConfigError::MissingField {
                field: "market_type_codes",
            }
            .into());
        }

        let schedule = &self.schedule;
        if schedule.base_period_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "base_period_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if schedule.discovery_every_cycles == 0 {
            return Err(ConfigError::InvalidValue {
                field: "discovery_every_cycles",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if schedule.error_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "error_threshold",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if schedule.error_backoff_factor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "error_backoff_factor",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.buffer.max_pending_snapshots == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_pending_snapshots",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.sinks.enabled().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sinks",
                reason: "at least one sink must be enabled".to_string(),
            }
            .into());
        }
        if self.sinks.sqlite.enabled && self.sinks.sqlite.database.is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if self.sinks.search.enabled {
            if self.sinks.search.url.is_empty() {
                return Err(ConfigError::MissingField { field: "url" }.into());
            }
            if self.sinks.search.index_prefix.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "index_prefix",
                }
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.tracking.max_slots, 10);
        assert_eq!(config.tracking.max_request_event_ids, 30);
        assert_eq!(config.tracking.min_traded_volume, Decimal::from(100));
        assert_eq!(config.tracking.lookahead_minutes, 120);
        assert_eq!(config.schedule.base_period_secs, 30);
        assert_eq!(config.schedule.discovery_every_cycles, 10);
        assert_eq!(config.schedule.error_threshold, 10);
        assert_eq!(config.schedule.error_backoff_factor, 20);
        assert_eq!(config.sinks.enabled(), vec!["csv"]);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse_toml(
            r#"
            [tracking]
            max_slots = 4
            min_traded_volume = 250.5

            [schedule]
            base_period_secs = 5

            [sinks.csv]
            enabled = false

            [sinks.sqlite]
            enabled = true
            database = "/tmp/markets.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.tracking.max_slots, 4);
        assert_eq!(config.tracking.min_traded_volume.to_string(), "250.5");
        assert_eq!(config.schedule.base_period_secs, 5);
        assert_eq!(config.sinks.enabled(), vec!["sqlite"]);
    }

    #[test]
    fn zero_slots_rejected() {
        let result = Config::parse_toml("[tracking]\nmax_slots = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "max_slots",
                ..
            }))
        ));
    }

    #[test]
    fn all_sinks_disabled_rejected() {
        let result = Config::parse_toml("[sinks.csv]\nenabled = false\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { field: "sinks", .. }))
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let result = Config::parse_toml("[tracking\nmax_slots = 3");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }
}
