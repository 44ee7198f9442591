//! Polling loop timing configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::SchedulePolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between successful cycles.
    #[serde(default = "default_base_period_secs")]
    pub base_period_secs: u64,
    /// Discovery runs once every this many successful cycles.
    #[serde(default = "default_discovery_every_cycles")]
    pub discovery_every_cycles: u32,
    /// Consecutive failures before the long backoff.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    /// Long backoff is the base period times this factor.
    #[serde(default = "default_error_backoff_factor")]
    pub error_backoff_factor: u32,
}

const fn default_base_period_secs() -> u64 {
    30
}

const fn default_discovery_every_cycles() -> u32 {
    10
}

const fn default_error_threshold() -> u32 {
    10
}

const fn default_error_backoff_factor() -> u32 {
    20
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            base_period_secs: default_base_period_secs(),
            discovery_every_cycles: default_discovery_every_cycles(),
            error_threshold: default_error_threshold(),
            error_backoff_factor: default_error_backoff_factor(),
        }
    }
}

impl From<&ScheduleConfig> for SchedulePolicy {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            base_period: Duration::from_secs(config.base_period_secs),
            discovery_every: config.discovery_every_cycles,
            error_threshold: config.error_threshold,
            error_backoff_factor: config.error_backoff_factor,
        }
    }
}
