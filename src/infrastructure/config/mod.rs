//! Infrastructure configuration modules.

pub mod logging;
pub mod schedule;
pub mod settings;
pub mod sinks;
pub mod tracking;
