//! Waypoint paths and progress tracking
//!
//! Paths are ordered waypoint lists, optionally split into disjoint
//! segments by `Broken` points. The tracker reports progress and events;
//! rendering and celebration effects belong to the consumer.

pub mod library;
pub mod stats;
pub mod tracker;
pub mod waypoint;

pub use library::PathLibrary;
pub use stats::{CompletionStats, PathRecord};
pub use tracker::{NavigationInfo, PathEvent, PathProgressTracker, PathState};
pub use waypoint::{load_waypoints, segment_ranges, Connection, Waypoint, WaypointRole};
