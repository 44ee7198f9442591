//! Builders for domain primitives used across tests.
//!
//! Ids follow one scheme everywhere: market `n` is `1.n`, its event is
//! `e<n>`, and its runners are `1000 * n + k`.

use rust_decimal::Decimal;

use crate::domain::{
    Candidate, Competition, EventId, MarketBook, MarketId, MarketStatus, PriceSize, RunnerBook,
    RunnerName, RunnerStatus, SelectionId,
};
use crate::port::{EventSummary, MarketCatalogue};

pub fn market_id(n: u64) -> MarketId {
    MarketId::new(format!("1.{n}"))
}

pub fn event_id(n: u64) -> EventId {
    EventId::new(format!("e{n}"))
}

/// Home and away runners of market `n`. The draw is added by [`catalogue`].
pub fn runners(n: u64) -> Vec<RunnerName> {
    vec![
        RunnerName::new(SelectionId::new(1000 * n + 1), format!("Home {n}")),
        RunnerName::new(SelectionId::new(1000 * n + 2), format!("Away {n}")),
    ]
}

pub fn event(n: u64) -> EventSummary {
    EventSummary {
        id: event_id(n),
        name: format!("Home {n} v Away {n}"),
        country_code: Some("GB".into()),
        open_date: None,
    }
}

pub fn events(range: std::ops::Range<u64>) -> Vec<EventSummary> {
    range.map(event).collect()
}

pub fn candidate(n: u64, volume: Decimal) -> Candidate {
    Candidate::new(market_id(n), event_id(n), volume)
        .with_country("GB")
        .with_competition("10932509", "English Premier League")
        .with_runners(runners(n))
}

/// Match-odds catalogue entry for market `n`, including the draw.
pub fn catalogue(n: u64, volume: Decimal) -> MarketCatalogue {
    let mut runners = runners(n);
    runners.push(RunnerName::the_draw());
    MarketCatalogue {
        market_id: market_id(n),
        market_name: "Match Odds".into(),
        event: Some(event(n)),
        competition: Some(Competition {
            id: "10932509".into(),
            name: "English Premier League".into(),
        }),
        total_matched: Some(volume),
        runners,
    }
}

/// Active runner with the given back and lay ladders, best first.
pub fn runner(
    selection: u64,
    back: &[(Decimal, Decimal)],
    lay: &[(Decimal, Decimal)],
) -> RunnerBook {
    RunnerBook {
        available_to_back: back.iter().map(|&(p, s)| PriceSize::new(p, s)).collect(),
        available_to_lay: lay.iter().map(|&(p, s)| PriceSize::new(p, s)).collect(),
        ..RunnerBook::new(SelectionId::new(selection), RunnerStatus::Active)
    }
}

pub fn book(n: u64, status: MarketStatus, inplay: bool, runners: Vec<RunnerBook>) -> MarketBook {
    MarketBook {
        market_id: market_id(n),
        status,
        inplay,
        runners,
    }
}

/// Closed book of market `n`; `winner` is a selection id, if settled.
pub fn closed_book(n: u64, winner: Option<u64>) -> MarketBook {
    let runners = [1000 * n + 1, 1000 * n + 2, SelectionId::THE_DRAW.value()]
        .into_iter()
        .map(|id| {
            let status = if Some(id) == winner {
                RunnerStatus::Winner
            } else if winner.is_some() {
                RunnerStatus::Loser
            } else {
                RunnerStatus::Active
            };
            RunnerBook::new(SelectionId::new(id), status)
        })
        .collect();
    book(n, MarketStatus::Closed, false, runners)
}
