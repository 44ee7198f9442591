//! Exchange-agnostic domain types.
//!
//! - [`id`] - Identifier newtypes for markets, events and runners
//! - [`market`] - Tracked markets and discovery candidates
//! - [`book`] - Polled market books
//! - [`snapshot`] - Per-runner time-series rows and the no-liquidity sentinel
//! - [`record`] - The record streams written to persistence

pub mod book;
pub mod id;
pub mod market;
pub mod record;
pub mod snapshot;

pub use book::{MarketBook, PriceSize, RunnerBook, RunnerStatus};
pub use id::{EventId, MarketId, SelectionId};
pub use market::{Candidate, Competition, MarketStatus, TrackedMarket};
pub use record::{MarketInfo, MarketResult, RecordBatch, RunnerName};
pub use snapshot::{Snapshot, EMPTY_LEVEL, NO_LIQUIDITY, PRICE_DEPTH};
