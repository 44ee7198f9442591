//! Exchange port for market discovery and book polling.
//!
//! These traits define the interface the tracking engine needs from a
//! betting exchange. The engine never sees wire formats; adapters convert
//! to and from the types below.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{Competition, EventId, MarketBook, MarketId, RunnerName};
use crate::error::Result;

/// Half-open UTC window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Window starting at `now` and spanning `lookahead`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, lookahead: Duration) -> Self {
        Self {
            from: now,
            to: now + lookahead,
        }
    }
}

/// Market filter shared by event and catalogue queries.
///
/// Empty collections and `None` fields are not sent upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketFilter {
    pub event_type_ids: Vec<String>,
    pub event_ids: Vec<EventId>,
    pub market_type_codes: Vec<String>,
    pub market_betting_types: Vec<String>,
    pub market_start_time: Option<TimeRange>,
    pub turn_in_play_enabled: Option<bool>,
    pub in_play_only: Option<bool>,
}

/// Extra catalogue data to project into the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketProjection {
    Competition,
    Event,
    MarketStartTime,
    RunnerMetadata,
}

/// Catalogue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSort {
    /// Highest traded volume first.
    MaximumTraded,
    FirstToStart,
}

/// Which price data a book poll returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceData {
    /// Best three offers on each side.
    ExBestOffers,
    ExTraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceProjection {
    pub price_data: Vec<PriceData>,
}

impl PriceProjection {
    #[must_use]
    pub fn best_offers() -> Self {
        Self {
            price_data: vec![PriceData::ExBestOffers],
        }
    }
}

/// Event header returned by an event listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub id: EventId,
    pub name: String,
    pub country_code: Option<String>,
    pub open_date: Option<DateTime<Utc>>,
}

/// Catalogue entry for one market.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketCatalogue {
    pub market_id: MarketId,
    pub market_name: String,
    pub event: Option<EventSummary>,
    pub competition: Option<Competition>,
    pub total_matched: Option<Decimal>,
    pub runners: Vec<RunnerName>,
}

/// Read access to a betting exchange under an authenticated session.
#[async_trait]
pub trait BettingExchange: Send + Sync {
    /// List events matching the filter.
    async fn list_events(&self, filter: &MarketFilter) -> Result<Vec<EventSummary>>;

    /// List market catalogues matching the filter.
    async fn list_market_catalogues(
        &self,
        filter: &MarketFilter,
        projection: &[MarketProjection],
        max_results: usize,
        sort: MarketSort,
    ) -> Result<Vec<MarketCatalogue>>;

    /// Poll the books of the given markets.
    async fn list_market_books(
        &self,
        market_ids: &[MarketId],
        projection: &PriceProjection,
    ) -> Result<Vec<MarketBook>>;

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

/// Opens authenticated exchange sessions.
///
/// Called once at startup and again whenever a session expires.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn BettingExchange>>;
}
