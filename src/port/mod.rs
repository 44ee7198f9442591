//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`BettingExchange`], [`SessionConnector`] - Exchange integration
//! - [`RecordSink`] - Persistence of runner names, market info, results and
//!   market data

pub mod outbound;

pub use outbound::exchange::{
    BettingExchange, EventSummary, MarketCatalogue, MarketFilter, MarketProjection, MarketSort,
    PriceData, PriceProjection, SessionConnector, TimeRange,
};
pub use outbound::sink::RecordSink;
