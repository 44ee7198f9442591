//! Bounded-slot admission of markets into the tracked set.
//!
//! The [`AdmissionManager`] owns the tracked markets, the free slot count and
//! the event blacklist. Discovery asks the exchange for upcoming events and
//! their catalogues; admission filters the resulting candidates and fills the
//! free slots in descending traded-volume order.
//!
//! Every candidate that gets considered has its parent event blacklisted,
//! whether it was admitted, too thin, or beyond the slot limit. This keeps an
//! event from oscillating in and out of the tracked set across discovery
//! cycles.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::buffer::PendingWrites;
use crate::domain::{Candidate, EventId, MarketId, MarketInfo, MarketStatus, TrackedMarket};
use crate::error::Result;
use crate::port::{
    BettingExchange, MarketCatalogue, MarketFilter, MarketProjection, MarketSort, TimeRange,
};

/// Betting type restriction applied to event discovery.
const ODDS_BETTING_TYPE: &str = "ODDS";

/// Catalogue data needed to build candidates.
const CATALOGUE_PROJECTION: [MarketProjection; 4] = [
    MarketProjection::Event,
    MarketProjection::MarketStartTime,
    MarketProjection::RunnerMetadata,
    MarketProjection::Competition,
];

/// Limits and filters applied by the admission manager.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    /// Maximum number of markets tracked at once.
    pub max_slots: usize,
    /// Maximum number of event ids sent in one catalogue query.
    pub max_request_event_ids: usize,
    /// Markets must have traded strictly more than this to be admitted.
    pub min_traded_volume: Decimal,
    /// Result cap of the catalogue query.
    pub max_catalogue_results: usize,
    /// Event type to discover (1 is soccer).
    pub event_type_id: String,
    /// How far ahead of kick-off markets are picked up.
    pub lookahead: chrono::Duration,
    /// Market type codes to track, e.g. `MATCH_ODDS`.
    pub market_type_codes: Vec<String>,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_slots: 10,
            max_request_event_ids: 30,
            min_traded_volume: Decimal::from(100),
            max_catalogue_results: 100,
            event_type_id: "1".into(),
            lookahead: chrono::Duration::minutes(120),
            market_type_codes: vec!["MATCH_ODDS".into()],
        }
    }
}

/// Owner of the tracked market set, capacity slots and event blacklist.
#[derive(Debug)]
pub struct AdmissionManager {
    policy: AdmissionPolicy,
    /// Tracked markets in admission order.
    tracked: Vec<TrackedMarket>,
    blacklist: HashSet<EventId>,
    available: usize,
}

impl AdmissionManager {
    #[must_use]
    pub fn new(policy: AdmissionPolicy) -> Self {
        let available = policy.max_slots;
        Self {
            policy,
            tracked: Vec::new(),
            blacklist: HashSet::new(),
            available,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Number of free tracking slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    #[must_use]
    pub fn tracked(&self) -> &[TrackedMarket] {
        &self.tracked
    }

    /// Ids of the tracked markets, in admission order.
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<MarketId> {
        self.tracked.iter().map(|m| m.id().clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    #[must_use]
    pub fn is_tracked(&self, market_id: &MarketId) -> bool {
        self.tracked.iter().any(|m| m.id() == market_id)
    }

    #[must_use]
    pub fn is_blacklisted(&self, event_id: &EventId) -> bool {
        self.blacklist.contains(event_id)
    }

    #[must_use]
    pub fn blacklist(&self) -> &HashSet<EventId> {
        &self.blacklist
    }

    /// Query the exchange for candidate markets starting within the lookahead.
    ///
    /// Makes no catalogue call when no event is found. Event ids beyond
    /// `max_request_event_ids` are dropped.
    ///
    /// # Errors
    ///
    /// Propagates exchange failures.
    pub async fn discover(
        &self,
        exchange: &dyn BettingExchange,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candidate>> {
        let event_filter = MarketFilter {
            event_type_ids: vec![self.policy.event_type_id.clone()],
            market_betting_types: vec![ODDS_BETTING_TYPE.to_string()],
            market_start_time: Some(TimeRange::starting_at(now, self.policy.lookahead)),
            turn_in_play_enabled: Some(true),
            in_play_only: Some(false),
            ..MarketFilter::default()
        };

        let events = exchange.list_events(&event_filter).await?;
        if events.is_empty() {
            info!(
                event_type_id = %self.policy.event_type_id,
                "No upcoming events found"
            );
            return Ok(Vec::new());
        }

        let found = events.len();
        let event_ids: Vec<EventId> = events
            .into_iter()
            .map(|event| event.id)
            .take(self.policy.max_request_event_ids)
            .collect();
        if found > event_ids.len() {
            debug!(
                found,
                requested = event_ids.len(),
                "Truncated event ids for catalogue query"
            );
        }

        let catalogue_filter = MarketFilter {
            event_ids,
            market_type_codes: self.policy.market_type_codes.clone(),
            ..MarketFilter::default()
        };
        let catalogues = exchange
            .list_market_catalogues(
                &catalogue_filter,
                &CATALOGUE_PROJECTION,
                self.policy.max_catalogue_results,
                MarketSort::MaximumTraded,
            )
            .await?;

        let candidates: Vec<Candidate> = catalogues.into_iter().filter_map(to_candidate).collect();
        debug!(events = found, candidates = candidates.len(), "Discovery finished");
        Ok(candidates)
    }

    /// Admit candidates into free slots.
    ///
    /// Reference rows (runner names and market info) of admitted markets are
    /// queued on `pending`. Returns the number of markets admitted.
    pub fn admit(&mut self, mut candidates: Vec<Candidate>, pending: &mut PendingWrites) -> usize {
        if self.available == 0 {
            debug!("No free slot, admission skipped");
            return 0;
        }

        // Stable, so equal volumes keep the upstream order.
        candidates.sort_by(|a, b| b.total_matched.cmp(&a.total_matched));

        let slots = self.available;
        let mut admitted = 0;
        for candidate in candidates {
            if !self.blacklist.insert(candidate.event_id.clone()) {
                debug!(
                    market_id = %candidate.market_id,
                    event_id = %candidate.event_id,
                    "Event already considered"
                );
                continue;
            }
            if candidate.total_matched <= self.policy.min_traded_volume {
                debug!(
                    market_id = %candidate.market_id,
                    total_matched = %candidate.total_matched,
                    "Traded volume below threshold"
                );
                continue;
            }
            if admitted == slots {
                debug!(market_id = %candidate.market_id, "No slot left for market");
                continue;
            }
            if self.is_tracked(&candidate.market_id) {
                continue;
            }

            pending.push_runner_names(candidate.runners.iter().cloned());
            pending.push_market_info(MarketInfo {
                market_id: candidate.market_id.clone(),
                country_code: candidate.country_code.clone(),
                competition_name: candidate.competition.as_ref().map(|c| c.name.clone()),
                competition_id: candidate.competition.as_ref().map(|c| c.id.clone()),
            });
            info!(
                market_id = %candidate.market_id,
                event_id = %candidate.event_id,
                total_matched = %candidate.total_matched,
                "Market admitted"
            );
            self.tracked
                .push(TrackedMarket::new(candidate.market_id, candidate.event_id));
            admitted += 1;
        }

        self.recompute_available();
        info!(
            admitted,
            tracked = self.tracked.len(),
            available = self.available,
            blacklisted = self.blacklist.len(),
            "Tracked markets updated"
        );
        admitted
    }

    /// Remove a market from the tracked set.
    ///
    /// Returns whether the market was tracked. Retiring an unknown id is a
    /// no-op.
    pub fn retire(&mut self, market_id: &MarketId) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|m| m.id() != market_id);
        let removed = self.tracked.len() != before;
        if removed {
            self.recompute_available();
            info!(market_id = %market_id, available = self.available, "Market retired");
        }
        removed
    }

    /// Record the latest status seen for a tracked market.
    pub fn update_status(&mut self, market_id: &MarketId, status: MarketStatus) {
        if let Some(market) = self.tracked.iter_mut().find(|m| m.id() == market_id) {
            market.set_status(status);
        }
    }

    fn recompute_available(&mut self) {
        self.available = self.policy.max_slots.saturating_sub(self.tracked.len());
    }
}

fn to_candidate(catalogue: MarketCatalogue) -> Option<Candidate> {
    let Some(event) = catalogue.event else {
        debug!(market_id = %catalogue.market_id, "Catalogue entry without event, skipped");
        return None;
    };

    Some(Candidate {
        market_id: catalogue.market_id,
        event_id: event.id,
        country_code: event.country_code,
        competition: catalogue.competition,
        total_matched: catalogue.total_matched.unwrap_or(Decimal::ZERO),
        runners: catalogue.runners,
    })
}
