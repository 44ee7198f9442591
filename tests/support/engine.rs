use std::sync::Arc;
use std::time::Duration;

use livebook::application::{
    AdmissionManager, AdmissionPolicy, PendingWrites, SchedulePolicy, Scheduler, SinkSet,
    TrackingEngine,
};
use livebook::port::RecordSink;
use livebook::testkit::exchange::{ScriptedConnector, ScriptedExchange};

pub fn policy(max_slots: usize) -> AdmissionPolicy {
    AdmissionPolicy {
        max_slots,
        ..AdmissionPolicy::default()
    }
}

pub fn engine(
    exchange: &ScriptedExchange,
    policy: AdmissionPolicy,
    sinks: Vec<Arc<dyn RecordSink>>,
) -> TrackingEngine {
    TrackingEngine::new(
        Box::new(exchange.clone()),
        AdmissionManager::new(policy),
        PendingWrites::default(),
        SinkSet::new(sinks),
    )
}

/// Scheduler with a 30s base period, discovery every `discovery_every`
/// cycles and long backoff after `error_threshold` failures.
pub fn scheduler(
    engine: TrackingEngine,
    connector: Arc<ScriptedConnector>,
    discovery_every: u32,
    error_threshold: u32,
) -> Scheduler {
    Scheduler::new(
        engine,
        connector,
        SchedulePolicy {
            base_period: Duration::from_secs(30),
            discovery_every,
            error_threshold,
            error_backoff_factor: 20,
        },
    )
}
