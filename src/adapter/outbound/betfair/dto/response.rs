//! Betting and identity API response payloads.
//!
//! Prices and volumes arrive as JSON numbers and are read straight into
//! [`Decimal`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    Competition, EventId, MarketBook, MarketId, MarketStatus, PriceSize, RunnerBook, RunnerName,
    RunnerStatus, SelectionId,
};
use crate::port::{EventSummary, MarketCatalogue};

/// Response of the certificate login endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub session_token: Option<String>,
    pub login_status: String,
}

/// Error body returned with a non-success status.
#[derive(Debug, Deserialize)]
pub struct FaultResponse {
    #[serde(default)]
    pub faultstring: Option<String>,
    #[serde(default)]
    pub detail: Option<FaultDetail>,
}

#[derive(Debug, Deserialize)]
pub struct FaultDetail {
    #[serde(rename = "APINGException", default)]
    pub aping_exception: Option<ApingException>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApingException {
    pub error_code: String,
    #[serde(default)]
    pub error_details: Option<String>,
}

impl FaultResponse {
    /// The API error code, falling back to the fault string.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.aping_exception.as_ref())
            .map(|e| e.error_code.as_str())
            .or(self.faultstring.as_deref())
    }

    #[must_use]
    pub fn error_details(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.aping_exception.as_ref())
            .and_then(|e| e.error_details.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub open_date: Option<DateTime<Utc>>,
}

impl From<EventDto> for EventSummary {
    fn from(e: EventDto) -> Self {
        Self {
            id: EventId::new(e.id),
            name: e.name.unwrap_or_default(),
            country_code: e.country_code,
            open_date: e.open_date,
        }
    }
}

/// One entry of `listEvents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResultDto {
    pub event: EventDto,
    #[serde(default)]
    pub market_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CompetitionDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerCatalogDto {
    pub selection_id: u64,
    pub runner_name: String,
}

/// One entry of `listMarketCatalogue`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCatalogueDto {
    pub market_id: String,
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub total_matched: Option<Decimal>,
    #[serde(default)]
    pub runners: Vec<RunnerCatalogDto>,
    #[serde(default)]
    pub event: Option<EventDto>,
    #[serde(default)]
    pub competition: Option<CompetitionDto>,
}

impl From<MarketCatalogueDto> for MarketCatalogue {
    fn from(m: MarketCatalogueDto) -> Self {
        Self {
            market_id: MarketId::new(m.market_id),
            market_name: m.market_name.unwrap_or_default(),
            event: m.event.map(EventSummary::from),
            competition: m.competition.map(|c| Competition {
                id: c.id,
                name: c.name,
            }),
            total_matched: m.total_matched,
            runners: m
                .runners
                .into_iter()
                .map(|r| RunnerName::new(SelectionId::new(r.selection_id), r.runner_name))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceSizeDto {
    pub price: Decimal,
    pub size: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePricesDto {
    #[serde(default)]
    pub available_to_back: Vec<PriceSizeDto>,
    #[serde(default)]
    pub available_to_lay: Vec<PriceSizeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerDto {
    pub selection_id: u64,
    pub status: RunnerStatus,
    #[serde(default)]
    pub last_price_traded: Option<Decimal>,
    #[serde(default)]
    pub ex: Option<ExchangePricesDto>,
}

fn levels(side: Vec<PriceSizeDto>) -> Vec<PriceSize> {
    side.into_iter()
        .map(|l| PriceSize::new(l.price, l.size))
        .collect()
}

impl From<RunnerDto> for RunnerBook {
    fn from(r: RunnerDto) -> Self {
        let ex = r.ex.unwrap_or_default();
        Self {
            selection_id: SelectionId::new(r.selection_id),
            status: r.status,
            last_price_traded: r.last_price_traded,
            available_to_back: levels(ex.available_to_back),
            available_to_lay: levels(ex.available_to_lay),
        }
    }
}

/// One entry of `listMarketBook`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBookDto {
    pub market_id: String,
    pub status: MarketStatus,
    #[serde(default)]
    pub inplay: bool,
    #[serde(default)]
    pub runners: Vec<RunnerDto>,
}

impl From<MarketBookDto> for MarketBook {
    fn from(b: MarketBookDto) -> Self {
        Self {
            market_id: MarketId::new(b.market_id),
            status: b.status,
            inplay: b.inplay,
            runners: b.runners.into_iter().map(RunnerBook::from).collect(),
        }
    }
}
