//! Market admission and buffering configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::buffer::DEFAULT_MAX_PENDING_SNAPSHOTS;
use crate::application::AdmissionPolicy;

/// Admission limits and discovery filters.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Maximum markets tracked at once.
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
    /// Maximum event ids per catalogue query.
    #[serde(default = "default_max_request_event_ids")]
    pub max_request_event_ids: usize,
    /// Markets must have traded strictly more than this.
    #[serde(default = "default_min_traded_volume")]
    pub min_traded_volume: Decimal,
    /// Result cap of the catalogue query.
    #[serde(default = "default_max_catalogue_results")]
    pub max_catalogue_results: usize,
    /// Exchange event type to track (1 is soccer).
    #[serde(default = "default_event_type_id")]
    pub event_type_id: String,
    /// How long before kick-off a market becomes eligible.
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: i64,
    #[serde(default = "default_market_type_codes")]
    pub market_type_codes: Vec<String>,
}

const fn default_max_slots() -> usize {
    10
}

const fn default_max_request_event_ids() -> usize {
    30
}

fn default_min_traded_volume() -> Decimal {
    Decimal::from(100)
}

const fn default_max_catalogue_results() -> usize {
    100
}

fn default_event_type_id() -> String {
    "1".into()
}

/// Longest accepted lookahead (seven days).
pub const MAX_LOOKAHEAD_MINUTES: i64 = 7 * 24 * 60;

const fn default_lookahead_minutes() -> i64 {
    120
}

fn default_market_type_codes() -> Vec<String> {
    vec!["MATCH_ODDS".into()]
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_slots: default_max_slots(),
            max_request_event_ids: default_max_request_event_ids(),
            min_traded_volume: default_min_traded_volume(),
            max_catalogue_results: default_max_catalogue_results(),
            event_type_id: default_event_type_id(),
            lookahead_minutes: default_lookahead_minutes(),
            market_type_codes: default_market_type_codes(),
        }
    }
}

impl From<&TrackingConfig> for AdmissionPolicy {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            max_slots: config.max_slots,
            max_request_event_ids: config.max_request_event_ids,
            min_traded_volume: config.min_traded_volume,
            max_catalogue_results: config.max_catalogue_results,
            event_type_id: config.event_type_id.clone(),
            lookahead: chrono::Duration::minutes(config.lookahead_minutes),
            market_type_codes: config.market_type_codes.clone(),
        }
    }
}

/// Pending-write buffer limits.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    /// Snapshot rows held while sinks are failing before the oldest are dropped.
    #[serde(default = "default_max_pending_snapshots")]
    pub max_pending_snapshots: usize,
}

const fn default_max_pending_snapshots() -> usize {
    DEFAULT_MAX_PENDING_SNAPSHOTS
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_pending_snapshots: default_max_pending_snapshots(),
        }
    }
}
