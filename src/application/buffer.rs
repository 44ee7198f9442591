//! In-memory write buffer and sink fan-out.
//!
//! Rows accumulate in an open [`RecordBatch`]. A flush seals the open batch
//! and hands it to every sink; the sealed batch is only dropped once every
//! sink has acknowledged it. A failed flush keeps the sealed batch and the
//! acknowledgements already received, so the retry only re-sends to the sinks
//! that missed it.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{MarketInfo, MarketResult, RecordBatch, RunnerName, SelectionId, Snapshot};
use crate::error::Result;
use crate::port::RecordSink;

/// Default cap on buffered snapshot rows.
pub const DEFAULT_MAX_PENDING_SNAPSHOTS: usize = 50_000;

/// A batch handed to the sinks, with the sinks that have acknowledged it.
#[derive(Debug, Default)]
struct SealedBatch {
    batch: RecordBatch,
    acked: HashSet<usize>,
}

/// Records produced since the last successful flush.
#[derive(Debug)]
pub struct PendingWrites {
    open: RecordBatch,
    sealed: Option<SealedBatch>,
    /// Runners already queued during this process lifetime.
    known_runners: HashSet<SelectionId>,
    max_snapshots: usize,
    dropped_snapshots: u64,
}

impl Default for PendingWrites {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING_SNAPSHOTS)
    }
}

impl PendingWrites {
    /// Create an empty buffer holding at most `max_snapshots` snapshot rows.
    #[must_use]
    pub fn new(max_snapshots: usize) -> Self {
        // The draw is seeded by every sink at bootstrap.
        let known_runners = HashSet::from([SelectionId::THE_DRAW]);
        Self {
            open: RecordBatch::default(),
            sealed: None,
            known_runners,
            max_snapshots,
            dropped_snapshots: 0,
        }
    }

    /// Rows not yet handed to the sinks.
    #[must_use]
    pub fn open(&self) -> &RecordBatch {
        &self.open
    }

    /// Rows handed to the sinks but not acknowledged by all of them.
    #[must_use]
    pub fn sealed(&self) -> Option<&RecordBatch> {
        self.sealed.as_ref().map(|s| &s.batch)
    }

    /// Total rows waiting for delivery.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len() + self.sealed.as_ref().map_or(0, |s| s.batch.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot rows dropped so far because the buffer was full.
    #[must_use]
    pub fn dropped_snapshots(&self) -> u64 {
        self.dropped_snapshots
    }

    /// Queue runner names, skipping runners already queued before.
    pub fn push_runner_names(&mut self, names: impl IntoIterator<Item = RunnerName>) {
        for name in names {
            if self.known_runners.insert(name.selection_id) {
                self.open.runner_names.push(name);
            }
        }
    }

    pub fn push_market_info(&mut self, info: MarketInfo) {
        self.open.market_info.push(info);
    }

    pub fn push_result(&mut self, result: MarketResult) {
        self.open.results.push(result);
    }

    /// Queue snapshot rows, dropping the oldest ones past the cap.
    pub fn push_snapshots(&mut self, rows: Vec<Snapshot>) {
        self.open.snapshots.extend(rows);

        let sealed = self.sealed.as_ref().map_or(0, |s| s.batch.snapshots.len());
        let held = sealed + self.open.snapshots.len();
        if held <= self.max_snapshots {
            return;
        }

        let excess = (held - self.max_snapshots).min(self.open.snapshots.len());
        self.open.snapshots.drain(..excess);
        self.dropped_snapshots += excess as u64;
        warn!(
            dropped = excess,
            dropped_total = self.dropped_snapshots,
            max_snapshots = self.max_snapshots,
            "Snapshot buffer full, oldest rows dropped"
        );
    }

    /// Seal the open batch unless a sealed batch is already waiting.
    fn seal(&mut self) -> Option<&mut SealedBatch> {
        if self.sealed.is_none() && !self.open.is_empty() {
            self.sealed = Some(SealedBatch {
                batch: std::mem::take(&mut self.open),
                acked: HashSet::new(),
            });
        }
        self.sealed.as_mut()
    }
}

/// The set of sinks every batch is written to.
#[derive(Clone, Default)]
pub struct SinkSet {
    sinks: Vec<Arc<dyn RecordSink>>,
}

impl SinkSet {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn RecordSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Sink names, in write order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver every pending row to every sink.
    ///
    /// Returns the number of rows delivered. Rows stay pending when any sink
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns the first sink error of the attempt.
    pub async fn flush(&self, pending: &mut PendingWrites) -> Result<usize> {
        let mut delivered = 0;

        while let Some(sealed) = pending.seal() {
            let mut first_error = None;
            for (index, sink) in self.sinks.iter().enumerate() {
                if sealed.acked.contains(&index) {
                    continue;
                }
                match sink.write(&sealed.batch).await {
                    Ok(()) => {
                        debug!(sink = sink.name(), rows = sealed.batch.len(), "Batch written");
                        sealed.acked.insert(index);
                    }
                    Err(e) => {
                        error!(sink = sink.name(), error = %e, "Sink write failed");
                        first_error.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = first_error {
                return Err(e);
            }
            delivered += sealed.batch.len();
            pending.sealed = None;
        }

        Ok(delivered)
    }
}
