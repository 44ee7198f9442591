//! The polling loop: discovery cadence, tiered backoff and session recovery.
//!
//! Each cycle optionally runs discovery, always polls the tracked markets and
//! always flushes. A successful cycle sleeps the base period. A session
//! expiry triggers a re-login that swaps the exchange handle in place and
//! retries immediately; tracked markets, the blacklist and pending rows are
//! untouched. Any other failure sleeps the base period, or the base period
//! times the backoff factor once the consecutive-failure count reaches the
//! threshold. Only a successful cycle resets that count.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use super::engine::{SnapshotReport, TrackingEngine};
use crate::error::{Error, ErrorClass, Result};
use crate::port::SessionConnector;

/// Timing of the polling loop.
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    /// Pacing between successful cycles.
    pub base_period: Duration,
    /// Discovery runs once every this many successful cycles.
    pub discovery_every: u32,
    /// Consecutive failures before the long backoff kicks in.
    pub error_threshold: u32,
    /// Multiplier applied to the base period in long backoff.
    pub error_backoff_factor: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            base_period: Duration::from_secs(30),
            discovery_every: 10,
            error_threshold: 10,
            error_backoff_factor: 20,
        }
    }
}

/// Tracks when the next discovery is due.
///
/// Discovery is due on the first cycle and then once every `period`
/// successful cycles. When a due discovery is skipped because no slot is
/// free, it stays due so it is retried on the next cycle.
#[derive(Debug, Clone)]
pub struct DiscoveryCadence {
    period: u32,
    cycles_until_due: u32,
}

impl DiscoveryCadence {
    #[must_use]
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            cycles_until_due: 0,
        }
    }

    #[must_use]
    pub fn is_due(&self) -> bool {
        self.cycles_until_due == 0
    }

    /// Advance after a successful cycle.
    ///
    /// `deferred` is set when discovery was due but skipped for lack of
    /// slots.
    pub fn complete_cycle(&mut self, deferred: bool) {
        if deferred {
            return;
        }
        self.cycles_until_due = match self.cycles_until_due {
            0 => self.period - 1,
            n => n - 1,
        };
    }
}

/// Consecutive non-session failure counter.
#[derive(Debug, Clone)]
pub struct ErrorBudget {
    consecutive: u32,
    threshold: u32,
    factor: u32,
}

impl ErrorBudget {
    #[must_use]
    pub fn new(threshold: u32, factor: u32) -> Self {
        Self {
            consecutive: 0,
            threshold,
            factor,
        }
    }

    #[must_use]
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Count a failure and return how long to wait before retrying.
    pub fn record_failure(&mut self, base: Duration) -> Duration {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive < self.threshold {
            base
        } else {
            base.saturating_mul(self.factor)
        }
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub discovery_ran: bool,
    pub discovery_deferred: bool,
    pub admitted: usize,
    pub snapshot: SnapshotReport,
    pub written: usize,
    pub tracked: usize,
}

/// What a single cycle did and how long to wait before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed { report: CycleReport, delay: Duration },
    /// The session was renewed; the next cycle runs right away.
    SessionRecovered,
    Failed { consecutive: u32, delay: Duration },
}

impl CycleOutcome {
    /// Wait before the next cycle, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::Completed { delay, .. } | Self::Failed { delay, .. } => Some(*delay),
            Self::SessionRecovered => None,
        }
    }
}

pub struct Scheduler {
    engine: TrackingEngine,
    connector: Arc<dyn SessionConnector>,
    policy: SchedulePolicy,
    cadence: DiscoveryCadence,
    errors: ErrorBudget,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        engine: TrackingEngine,
        connector: Arc<dyn SessionConnector>,
        policy: SchedulePolicy,
    ) -> Self {
        let cadence = DiscoveryCadence::new(policy.discovery_every);
        let errors = ErrorBudget::new(policy.error_threshold, policy.error_backoff_factor);
        Self {
            engine,
            connector,
            policy,
            cadence,
            errors,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &TrackingEngine {
        &self.engine
    }

    #[must_use]
    pub fn cadence(&self) -> &DiscoveryCadence {
        &self.cadence
    }

    #[must_use]
    pub fn consecutive_errors(&self) -> u32 {
        self.errors.consecutive()
    }

    /// Run one cycle, classify its outcome and pick the next delay.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(report) => {
                self.cadence.complete_cycle(report.discovery_deferred);
                self.errors.reset();
                info!(
                    tracked = report.tracked,
                    admitted = report.admitted,
                    rows = report.snapshot.rows,
                    resolved = report.snapshot.resolved,
                    written = report.written,
                    "Cycle complete"
                );
                CycleOutcome::Completed {
                    report,
                    delay: self.policy.base_period,
                }
            }
            Err(e) if e.class() == ErrorClass::SessionExpired => self.recover_session(e).await,
            Err(e) => self.fail(&e),
        }
    }

    /// Run cycles until the shutdown flag is raised.
    ///
    /// The flag is checked between cycles and during sleeps; a cycle in
    /// flight always runs to completion.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            base_period_secs = self.policy.base_period.as_secs(),
            discovery_every = self.policy.discovery_every,
            "Polling loop started"
        );

        loop {
            if *shutdown.borrow() {
                info!("Shutdown signal received");
                break;
            }

            let Some(delay) = self.run_cycle().await.delay() else {
                continue;
            };

            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                () = tokio::time::sleep(delay) => {}
            }
        }

        let pending = self.engine.pending().len();
        if pending > 0 {
            warn!(pending, "Stopping with undelivered rows");
        }
        info!("Polling loop stopped");
    }

    async fn try_cycle(&mut self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        if self.cadence.is_due() {
            if self.engine.admission().available() == 0 {
                info!("All tracking slots in use, discovery deferred");
                report.discovery_deferred = true;
            } else {
                report.admitted = self.engine.run_discovery().await?;
                report.discovery_ran = true;
            }
        }

        report.snapshot = self.engine.run_snapshot_cycle().await?;
        report.written = self.engine.flush().await?;
        report.tracked = self.engine.admission().len();
        Ok(report)
    }

    async fn recover_session(&mut self, cause: Error) -> CycleOutcome {
        warn!(error = %cause, "Exchange session expired, logging in again");
        match self.connector.connect().await {
            Ok(exchange) => {
                self.engine.replace_exchange(exchange);
                info!(
                    tracked = self.engine.admission().len(),
                    "Session recovered"
                );
                CycleOutcome::SessionRecovered
            }
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, e: &Error) -> CycleOutcome {
        let delay = self.errors.record_failure(self.policy.base_period);
        let consecutive = self.errors.consecutive();
        error!(
            error = %e,
            details = ?e,
            consecutive,
            retry_in_secs = delay.as_secs(),
            "Cycle failed"
        );
        CycleOutcome::Failed { consecutive, delay }
    }
}
