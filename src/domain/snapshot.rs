//! Time-series snapshot rows produced by each poll.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::book::PriceSize;
use super::id::{MarketId, SelectionId};
use super::market::MarketStatus;

/// Number of price levels recorded per side.
pub const PRICE_DEPTH: usize = 3;

/// Price and size written for a level the book does not have.
///
/// No real quote can sit at 1.0 on the exchange tick ladder (the lowest
/// tradable price is 1.01), so consumers must read it as "no liquidity".
pub const NO_LIQUIDITY: Decimal = Decimal::ONE;

/// A level filled with [`NO_LIQUIDITY`].
pub const EMPTY_LEVEL: PriceSize = PriceSize::new(NO_LIQUIDITY, NO_LIQUIDITY);

/// One runner's order-book state at a poll instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub selection_id: SelectionId,
    pub back: [PriceSize; PRICE_DEPTH],
    pub lay: [PriceSize; PRICE_DEPTH],
    pub last_price_traded: Option<Decimal>,
    pub market_status: MarketStatus,
    pub inplay: bool,
    pub market_id: MarketId,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// True when the given back level carries a real quote.
    #[must_use]
    pub fn has_back(&self, level: usize) -> bool {
        self.back.get(level).is_some_and(|l| l.price != NO_LIQUIDITY)
    }

    /// True when the given lay level carries a real quote.
    #[must_use]
    pub fn has_lay(&self, level: usize) -> bool {
        self.lay.get(level).is_some_and(|l| l.price != NO_LIQUIDITY)
    }
}
