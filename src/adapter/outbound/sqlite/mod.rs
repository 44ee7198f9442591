//! SQLite persistence adapter.
//!
//! Stores runner names, market info, results and market data in four
//! tables using Diesel ORM.

pub mod database;
pub mod sink;

pub use sink::SqliteSink;
