//! Livebook - live betting-market tracking and order-book recording.
//!
//! Discovers upcoming markets on a betting exchange, tracks a bounded set of
//! them, polls their order books on a fixed cadence and records top-of-book
//! snapshots, reference data and settled results to pluggable sinks.
//!
//! # Architecture
//!
//! - [`domain`] - Exchange-agnostic types: ids, markets, books, records
//! - [`port`] - Traits the application depends on (`BettingExchange`,
//!   `SessionConnector`, `RecordSink`)
//! - [`application`] - Admission, snapshot processing, result resolution,
//!   pending-write buffering and the polling scheduler
//! - [`adapter`] - Betfair client plus CSV, SQLite and Elasticsearch sinks
//! - [`infrastructure`] - Configuration, wiring and process runtime
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use livebook::infrastructure::config::settings::Config;
//! use livebook::infrastructure::runtime::run_with_shutdown;
//!
//! # async fn example() -> livebook::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let (_tx, rx) = tokio::sync::watch::channel(false);
//! run_with_shutdown(config, rx).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
