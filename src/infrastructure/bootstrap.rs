//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::betfair::{BetfairConnector, BetfairCredentials};
use crate::adapter::outbound::flatfile::CsvSink;
use crate::adapter::outbound::search::SearchSink;
use crate::adapter::outbound::sqlite::SqliteSink;
use crate::application::{
    AdmissionManager, PendingWrites, SchedulePolicy, Scheduler, SinkSet, TrackingEngine,
};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::sinks::SinksConfig;
use crate::port::{RecordSink, SessionConnector};

/// Build every enabled sink, running CSV bootstrap and SQLite migrations.
///
/// # Errors
///
/// Returns the first sink that fails to open.
pub fn build_sinks(config: &SinksConfig) -> Result<SinkSet> {
    let mut sinks: Vec<Arc<dyn RecordSink>> = Vec::new();

    if config.csv.enabled {
        sinks.push(Arc::new(CsvSink::open(&config.csv.directory)?));
    }

    if config.sqlite.enabled {
        sinks.push(Arc::new(SqliteSink::open(&config.sqlite.database)?));
        info!(database = %config.sqlite.database, "SQLite sink ready");
    }

    if config.search.enabled {
        let sink = SearchSink::new(
            &config.search.url,
            config.search.index_prefix.clone(),
            config.search.credentials.clone(),
            Duration::from_millis(config.search.timeout_ms),
        )?;
        info!(
            url = %sink.bulk_url(),
            authenticated = config.search.credentials.is_some(),
            "Search sink ready"
        );
        sinks.push(Arc::new(sink));
    }

    Ok(SinkSet::new(sinks))
}

/// Build the exchange connector from the config and environment credentials.
///
/// # Errors
///
/// Returns an error if a credential variable is missing or the client
/// certificate cannot be loaded.
pub fn build_connector(config: &Config) -> Result<Arc<dyn SessionConnector>> {
    let credentials = BetfairCredentials::from_env()?;
    let connector = BetfairConnector::new(&config.exchange, credentials)?;
    Ok(Arc::new(connector))
}

/// Log in and assemble the scheduler around a fresh engine.
///
/// # Errors
///
/// Returns an error if the initial login fails.
pub async fn build_scheduler(
    config: &Config,
    connector: Arc<dyn SessionConnector>,
    sinks: SinkSet,
) -> Result<Scheduler> {
    let exchange = connector.connect().await?;
    info!(exchange = exchange.exchange_name(), "Session established");

    let engine = TrackingEngine::new(
        exchange,
        AdmissionManager::new((&config.tracking).into()),
        PendingWrites::new(config.buffer.max_pending_snapshots),
        sinks,
    );

    Ok(Scheduler::new(
        engine,
        connector,
        SchedulePolicy::from(&config.schedule),
    ))
}
