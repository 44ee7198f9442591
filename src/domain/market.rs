//! Market lifecycle types: tracked markets and discovery candidates.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{EventId, MarketId};
use super::record::RunnerName;

/// Market status as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Inactive,
    Open,
    Suspended,
    Closed,
}

impl MarketStatus {
    /// Exchange wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Open => "OPEN",
            Self::Suspended => "SUSPENDED",
            Self::Closed => "CLOSED",
        }
    }

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market currently occupying a tracking slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMarket {
    id: MarketId,
    event_id: EventId,
    status: MarketStatus,
}

impl TrackedMarket {
    /// A freshly admitted market starts out open.
    #[must_use]
    pub fn new(id: MarketId, event_id: EventId) -> Self {
        Self {
            id,
            event_id,
            status: MarketStatus::Open,
        }
    }

    #[must_use]
    pub fn id(&self) -> &MarketId {
        &self.id
    }

    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    #[must_use]
    pub fn status(&self) -> MarketStatus {
        self.status
    }

    pub fn set_status(&mut self, status: MarketStatus) {
        self.status = status;
    }
}

/// Competition a market belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub name: String,
}

/// A discovered market that has not been admitted yet.
///
/// Lives for a single discovery cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub market_id: MarketId,
    pub event_id: EventId,
    pub country_code: Option<String>,
    pub competition: Option<Competition>,
    /// Cumulative matched stake, used as the admission priority.
    pub total_matched: Decimal,
    pub runners: Vec<RunnerName>,
}

impl Candidate {
    #[must_use]
    pub fn new(market_id: MarketId, event_id: EventId, total_matched: Decimal) -> Self {
        Self {
            market_id,
            event_id,
            country_code: None,
            competition: None,
            total_matched,
            runners: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    #[must_use]
    pub fn with_competition(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.competition = Some(Competition {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    #[must_use]
    pub fn with_runners(mut self, runners: Vec<RunnerName>) -> Self {
        self.runners = runners;
        self
    }
}
