//! Exchange-agnostic market book as returned by a book poll.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, SelectionId};
use super::market::MarketStatus;

/// One price level on one side of a runner's book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: Decimal,
    pub size: Decimal,
}

impl PriceSize {
    #[must_use]
    pub const fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Runner status within a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerStatus {
    Active,
    Winner,
    Loser,
    Placed,
    RemovedVacant,
    Removed,
    Hidden,
}

/// Order-book state for a single runner.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerBook {
    pub selection_id: SelectionId,
    pub status: RunnerStatus,
    pub last_price_traded: Option<Decimal>,
    /// Best back offers, best first.
    pub available_to_back: Vec<PriceSize>,
    /// Best lay offers, best first.
    pub available_to_lay: Vec<PriceSize>,
}

impl RunnerBook {
    #[must_use]
    pub fn new(selection_id: SelectionId, status: RunnerStatus) -> Self {
        Self {
            selection_id,
            status,
            last_price_traded: None,
            available_to_back: Vec::new(),
            available_to_lay: Vec::new(),
        }
    }

    /// True when neither side carries any level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available_to_back.is_empty() && self.available_to_lay.is_empty()
    }
}

/// A polled market book.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBook {
    pub market_id: MarketId,
    pub status: MarketStatus,
    pub inplay: bool,
    pub runners: Vec<RunnerBook>,
}
