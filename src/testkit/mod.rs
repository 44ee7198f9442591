//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`exchange`] - Scripted [`BettingExchange`](crate::port::BettingExchange)
//!   and [`SessionConnector`](crate::port::SessionConnector) doubles.
//! - [`sink`] - Recording and failing [`RecordSink`](crate::port::RecordSink)
//!   implementations.
//! - [`domain`] - Builders for candidates, catalogues and books.

pub mod domain;
pub mod exchange;
pub mod sink;
