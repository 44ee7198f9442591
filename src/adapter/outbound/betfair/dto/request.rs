//! Betting API request bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::MarketId;
use crate::port::{MarketFilter, MarketProjection, MarketSort, PriceData, PriceProjection, TimeRange};

/// Wire format of filter timestamps.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn format_time(t: DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

#[derive(Debug, Serialize)]
pub struct TimeRangeDto {
    pub from: String,
    pub to: String,
}

impl From<&TimeRange> for TimeRangeDto {
    fn from(range: &TimeRange) -> Self {
        Self {
            from: format_time(range.from),
            to: format_time(range.to),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFilterDto {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_type_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub market_type_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub market_betting_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_start_time: Option<TimeRangeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_in_play_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_play_only: Option<bool>,
}

impl From<&MarketFilter> for MarketFilterDto {
    fn from(filter: &MarketFilter) -> Self {
        Self {
            event_type_ids: filter.event_type_ids.clone(),
            event_ids: filter
                .event_ids
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            market_type_codes: filter.market_type_codes.clone(),
            market_betting_types: filter.market_betting_types.clone(),
            market_start_time: filter.market_start_time.as_ref().map(TimeRangeDto::from),
            turn_in_play_enabled: filter.turn_in_play_enabled,
            in_play_only: filter.in_play_only,
        }
    }
}

/// Body of `listEvents`.
#[derive(Debug, Serialize)]
pub struct ListEventsRequest {
    pub filter: MarketFilterDto,
}

/// Body of `listMarketCatalogue`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketCatalogueRequest {
    pub filter: MarketFilterDto,
    pub market_projection: Vec<&'static str>,
    pub sort: &'static str,
    pub max_results: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProjectionDto {
    pub price_data: Vec<&'static str>,
}

impl From<&PriceProjection> for PriceProjectionDto {
    fn from(projection: &PriceProjection) -> Self {
        Self {
            price_data: projection.price_data.iter().map(|p| price_data_name(*p)).collect(),
        }
    }
}

/// Body of `listMarketBook`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMarketBookRequest {
    pub market_ids: Vec<String>,
    pub price_projection: PriceProjectionDto,
}

impl ListMarketBookRequest {
    #[must_use]
    pub fn new(market_ids: &[MarketId], projection: &PriceProjection) -> Self {
        Self {
            market_ids: market_ids.iter().map(|id| id.as_str().to_string()).collect(),
            price_projection: PriceProjectionDto::from(projection),
        }
    }
}

#[must_use]
pub const fn projection_name(projection: MarketProjection) -> &'static str {
    match projection {
        MarketProjection::Competition => "COMPETITION",
        MarketProjection::Event => "EVENT",
        MarketProjection::MarketStartTime => "MARKET_START_TIME",
        MarketProjection::RunnerMetadata => "RUNNER_METADATA",
    }
}

#[must_use]
pub const fn sort_name(sort: MarketSort) -> &'static str {
    match sort {
        MarketSort::MaximumTraded => "MAXIMUM_TRADED",
        MarketSort::FirstToStart => "FIRST_TO_START",
    }
}

#[must_use]
pub const fn price_data_name(data: PriceData) -> &'static str {
    match data {
        PriceData::ExBestOffers => "EX_BEST_OFFERS",
        PriceData::ExTraded => "EX_TRADED",
    }
}
