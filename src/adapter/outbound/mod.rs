//! Outbound adapters (driven side).
//!
//! - [`betfair`] - Exchange session and betting API
//! - [`flatfile`] - CSV record sink
//! - [`sqlite`] - SQLite record sink
//! - [`search`] - Elasticsearch record sink

pub mod betfair;
pub mod flatfile;
pub mod search;
pub mod sqlite;
