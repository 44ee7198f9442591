//! Betfair exchange integration.
//!
//! - [`session`] - Certificate login, implements [`SessionConnector`](crate::port::SessionConnector)
//! - [`client`] - Betting REST API, implements [`BettingExchange`](crate::port::BettingExchange)
//! - [`dto`] - Wire types
//! - [`settings`] - Endpoint configuration and credentials

pub mod client;
pub mod dto;
pub mod session;
pub mod settings;

pub use client::BetfairClient;
pub use session::BetfairConnector;
pub use settings::{BetfairConfig, BetfairCredentials};
