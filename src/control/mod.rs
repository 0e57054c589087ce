//! Contact-to-motion control
//!
//! This module contains the per-contact state machine, mode arbitration,
//! displacement computation and actor position smoothing applied on every
//! control tick.

pub mod displacement;
pub mod episode;
pub mod integrator;
pub mod mode;

pub use displacement::{raw_displacement, DisplacementController, Target};
pub use episode::{ControlEpisode, EpisodeTransition};
pub use integrator::PositionIntegrator;
pub use mode::{arbitrate_mode, classify_distance, ControlMode, ModeDecision};
