//! Application services (use cases).
//!
//! These services implement the tracking engine on top of the ports:
//! admission, snapshot processing, result resolution, buffering and the
//! polling loop.

pub mod admission;
pub mod buffer;
pub mod engine;
pub mod result;
pub mod scheduler;
pub mod snapshot;

pub use admission::{AdmissionManager, AdmissionPolicy};
pub use buffer::{PendingWrites, SinkSet};
pub use engine::{SnapshotReport, TrackingEngine};
pub use result::resolve_result;
pub use scheduler::{CycleOutcome, CycleReport, DiscoveryCadence, SchedulePolicy, Scheduler};
pub use snapshot::process_runner_books;
