//! Tick engine
//!
//! [`ControlLoop`] is the synchronous core. [`ControlRunner`] wraps it in a
//! tokio task with a command channel and snapshot sinks.

pub mod control_loop;
pub mod runner;
pub mod sink;
pub mod snapshot;

pub use control_loop::{ControlLoop, UNNAMED_PATH};
pub use runner::{ControlCommand, ControlRunner, RunnerHandle};
pub use sink::{JsonLinesSink, MemorySink, SnapshotSink};
pub use snapshot::ControlSnapshot;
