//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the tracking engine depends
//! on: the betting exchange and the persistence sinks.

pub mod exchange;
pub mod sink;
