//! The four record streams handed to persistence sinks.

use serde::{Deserialize, Serialize};

use super::id::{MarketId, SelectionId};
use super::snapshot::Snapshot;

/// Display name of a runner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunnerName {
    pub selection_id: SelectionId,
    pub name: String,
}

impl RunnerName {
    pub fn new(selection_id: SelectionId, name: impl Into<String>) -> Self {
        Self {
            selection_id,
            name: name.into(),
        }
    }

    /// The reference row seeded once into every fresh store.
    #[must_use]
    pub fn the_draw() -> Self {
        Self::new(SelectionId::THE_DRAW, "The Draw")
    }
}

/// Static information about an admitted market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_id: MarketId,
    pub country_code: Option<String>,
    pub competition_name: Option<String>,
    pub competition_id: Option<String>,
}

/// Winner of a closed market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketResult {
    pub market_id: MarketId,
    pub winner: SelectionId,
}

/// A batch of pending records across all four streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub runner_names: Vec<RunnerName>,
    pub market_info: Vec<MarketInfo>,
    pub results: Vec<MarketResult>,
    pub snapshots: Vec<Snapshot>,
}

impl RecordBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runner_names.len() + self.market_info.len() + self.results.len() + self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
