//! Winner resolution for closed markets.

use tracing::{info, warn};

use crate::domain::{MarketBook, MarketResult, RunnerStatus};

/// Find the winner of a closed market.
///
/// Returns `None` (and logs a warning) when no runner is marked as the
/// winner yet; settlement can lag behind closure, so the caller keeps the
/// market tracked and tries again on the next poll.
#[must_use]
pub fn resolve_result(book: &MarketBook) -> Option<MarketResult> {
    let winner = book
        .runners
        .iter()
        .find(|runner| runner.status == RunnerStatus::Winner)
        .map(|runner| runner.selection_id);

    match winner {
        Some(winner) => {
            info!(market_id = %book.market_id, winner = %winner, "Market result resolved");
            Some(MarketResult {
                market_id: book.market_id.clone(),
                winner,
            })
        }
        None => {
            warn!(market_id = %book.market_id, "Closed market has no winner yet");
            None
        }
    }
}
