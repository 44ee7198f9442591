//! Betfair data transfer objects.
//!
//! - Request bodies for the betting REST API
//! - Response and fault payloads of the betting and identity APIs

pub mod request;
pub mod response;
