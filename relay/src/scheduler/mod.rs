//! Poll scheduler
//!
//! Drives fetch, dispatch and acknowledgment on a fixed cadence, with a
//! manual force trigger that shares the same single-flight cycle.

mod poller;

pub use poller::{Poller, TickOutcome};
