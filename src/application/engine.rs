//! One polling cycle's worth of work against the exchange.
//!
//! The [`TrackingEngine`] ties the admission manager, the write buffer and
//! the sinks to an exchange session. It knows nothing about timing or
//! retries; the scheduler drives it.

use chrono::{SubsecRound, Utc};
use tracing::{debug, info};

use super::admission::AdmissionManager;
use super::buffer::{PendingWrites, SinkSet};
use super::result::resolve_result;
use super::snapshot::process_runner_books;
use crate::error::Result;
use crate::port::{BettingExchange, PriceProjection};

/// Outcome of one snapshot pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Markets whose books were requested.
    pub polled: usize,
    /// Snapshot rows queued.
    pub rows: usize,
    /// Closed markets resolved and retired.
    pub resolved: usize,
}

pub struct TrackingEngine {
    exchange: Box<dyn BettingExchange>,
    admission: AdmissionManager,
    pending: PendingWrites,
    sinks: SinkSet,
}

impl TrackingEngine {
    #[must_use]
    pub fn new(
        exchange: Box<dyn BettingExchange>,
        admission: AdmissionManager,
        pending: PendingWrites,
        sinks: SinkSet,
    ) -> Self {
        Self {
            exchange,
            admission,
            pending,
            sinks,
        }
    }

    #[must_use]
    pub fn admission(&self) -> &AdmissionManager {
        &self.admission
    }

    #[must_use]
    pub fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    #[must_use]
    pub fn sinks(&self) -> &SinkSet {
        &self.sinks
    }

    /// Swap in a freshly authenticated exchange session.
    pub fn replace_exchange(&mut self, exchange: Box<dyn BettingExchange>) {
        info!(exchange = exchange.exchange_name(), "Exchange session replaced");
        self.exchange = exchange;
    }

    /// Discover candidates and admit them into free slots.
    ///
    /// Returns the number of markets admitted.
    ///
    /// # Errors
    ///
    /// Propagates exchange failures; nothing is admitted in that case.
    pub async fn run_discovery(&mut self) -> Result<usize> {
        let candidates = self
            .admission
            .discover(self.exchange.as_ref(), Utc::now())
            .await?;
        Ok(self.admission.admit(candidates, &mut self.pending))
    }

    /// Poll the books of every tracked market.
    ///
    /// Closed markets with a winner are resolved and retired; every other
    /// book becomes snapshot rows stamped with the same whole-second
    /// timestamp. No request is made when nothing is tracked.
    ///
    /// # Errors
    ///
    /// Propagates exchange failures; no state changes in that case.
    pub async fn run_snapshot_cycle(&mut self) -> Result<SnapshotReport> {
        let market_ids = self.admission.tracked_ids();
        if market_ids.is_empty() {
            debug!("No tracked markets, snapshot skipped");
            return Ok(SnapshotReport::default());
        }

        let books = self
            .exchange
            .list_market_books(&market_ids, &PriceProjection::best_offers())
            .await?;
        let timestamp = Utc::now().trunc_subsecs(0);

        let mut report = SnapshotReport {
            polled: market_ids.len(),
            ..SnapshotReport::default()
        };
        for book in books {
            if !self.admission.is_tracked(&book.market_id) {
                debug!(market_id = %book.market_id, "Book for untracked market ignored");
                continue;
            }
            self.admission.update_status(&book.market_id, book.status);

            if book.status.is_closed() {
                if let Some(result) = resolve_result(&book) {
                    self.pending.push_result(result);
                    self.admission.retire(&book.market_id);
                    report.resolved += 1;
                }
                continue;
            }

            let rows = process_runner_books(
                &book.runners,
                book.status,
                book.inplay,
                &book.market_id,
                timestamp,
            );
            report.rows += rows.len();
            self.pending.push_snapshots(rows);
        }

        debug!(
            polled = report.polled,
            rows = report.rows,
            resolved = report.resolved,
            "Snapshot pass finished"
        );
        Ok(report)
    }

    /// Write pending rows to every sink.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure; rows stay pending.
    pub async fn flush(&mut self) -> Result<usize> {
        self.sinks.flush(&mut self.pending).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::application::AdmissionPolicy;
    use crate::domain::{MarketStatus, SelectionId};
    use crate::testkit::domain::{book, catalogue, closed_book, events, market_id, runner};
    use crate::testkit::exchange::{transient, ScriptedExchange};
    use crate::testkit::sink::RecordingSink;

    fn engine(exchange: &ScriptedExchange, sink: &Arc<RecordingSink>) -> TrackingEngine {
        TrackingEngine::new(
            Box::new(exchange.clone()),
            AdmissionManager::new(AdmissionPolicy::default()),
            PendingWrites::default(),
            SinkSet::new(vec![sink.clone()]),
        )
    }

    async fn track(engine: &mut TrackingEngine, exchange: &ScriptedExchange, markets: &[u64]) {
        exchange.push_events(Ok(events(0..markets.len() as u64)));
        exchange.push_catalogues(Ok(markets
            .iter()
            .map(|&n| catalogue(n, dec!(5000)))
            .collect()));
        engine.run_discovery().await.unwrap();
    }

    #[tokio::test]
    async fn snapshot_is_skipped_without_tracked_markets() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);

        let report = engine.run_snapshot_cycle().await.unwrap();

        assert_eq!(report, SnapshotReport::default());
        assert!(exchange.book_requests().is_empty());
    }

    #[tokio::test]
    async fn open_books_become_snapshot_rows() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);
        track(&mut engine, &exchange, &[1]).await;

        exchange.push_books(Ok(vec![book(
            1,
            MarketStatus::Open,
            true,
            vec![
                runner(1001, &[(dec!(2.5), dec!(100))], &[(dec!(2.6), dec!(80))]),
                runner(1002, &[], &[]),
            ],
        )]));
        let report = engine.run_snapshot_cycle().await.unwrap();

        assert_eq!(report.polled, 1);
        assert_eq!(report.rows, 2);
        assert_eq!(exchange.book_requests(), vec![vec![market_id(1)]]);
        let rows = &engine.pending().open().snapshots;
        assert!(rows.iter().all(|r| r.inplay));
        assert_eq!(rows[0].timestamp, rows[1].timestamp);
        assert_eq!(rows[0].timestamp.timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn closed_market_is_resolved_and_retired() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);
        track(&mut engine, &exchange, &[1, 2]).await;

        exchange.push_books(Ok(vec![
            closed_book(1, Some(1002)),
            book(2, MarketStatus::Suspended, true, vec![runner(2001, &[], &[])]),
        ]));
        let report = engine.run_snapshot_cycle().await.unwrap();

        assert_eq!(report.resolved, 1);
        assert_eq!(report.rows, 0);
        assert!(!engine.admission().is_tracked(&market_id(1)));
        assert!(engine.admission().is_tracked(&market_id(2)));
        let results = &engine.pending().open().results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winner, SelectionId::new(1002));
    }

    #[tokio::test]
    async fn closed_market_without_winner_stays_tracked() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);
        track(&mut engine, &exchange, &[1]).await;

        exchange.push_books(Ok(vec![closed_book(1, None)]));
        let report = engine.run_snapshot_cycle().await.unwrap();

        assert_eq!(report.resolved, 0);
        assert!(engine.admission().is_tracked(&market_id(1)));
        assert!(engine.pending().open().results.is_empty());
        assert!(engine.pending().open().snapshots.is_empty());
    }

    #[tokio::test]
    async fn poll_failure_leaves_state_untouched() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);
        track(&mut engine, &exchange, &[1]).await;
        let queued = engine.pending().len();

        exchange.push_books(Err(transient("connection reset")));
        assert!(engine.run_snapshot_cycle().await.is_err());

        assert!(engine.admission().is_tracked(&market_id(1)));
        assert_eq!(engine.pending().len(), queued);
    }

    #[tokio::test]
    async fn flush_delivers_reference_rows_of_admitted_markets() {
        let exchange = ScriptedExchange::new();
        let sink = Arc::new(RecordingSink::new("mem"));
        let mut engine = engine(&exchange, &sink);
        track(&mut engine, &exchange, &[1]).await;

        let written = engine.flush().await.unwrap();

        // Two runner names (the draw is pre-seeded) and one market info row.
        assert_eq!(written, 3);
        assert!(engine.pending().is_empty());
        let batch = &sink.batches()[0];
        assert_eq!(batch.runner_names.len(), 2);
        assert_eq!(batch.market_info[0].market_id, market_id(1));
    }
}
