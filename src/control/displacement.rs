//! Mode-specific displacement
//!
//! Joystick mode is a direct signal proportional to the anchor distance and
//! is recomputed from scratch every tick. Touchpad mode feeds the same
//! clamped signal through exponential smoothing held in the episode's
//! accumulator and produces an absolute target position.

use crate::config::DisplacementConfig;
use crate::control::episode::ControlEpisode;
use crate::control::mode::ControlMode;
use crate::geometry::Vector2;
use serde::{Deserialize, Serialize};

/// Target handed to the position integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Target {
    /// Offset relative to the current actor position
    Offset(Vector2),
    /// Absolute position in world coordinates
    Absolute(Vector2),
}

impl Target {
    /// Resolve to an absolute point given the current actor position
    pub fn resolve(self, position: Vector2) -> Vector2 {
        match self {
            Target::Offset(offset) => position + offset,
            Target::Absolute(point) => point,
        }
    }
}

/// Clamped, scaled anchor-to-COP vector
pub fn raw_displacement(anchor: Vector2, current: Vector2, config: &DisplacementConfig) -> Vector2 {
    ((current - anchor) * config.sensitivity).clamp_length(config.max_range)
}

/// Produces per-tick targets from the current control mode
#[derive(Debug, Clone, Default)]
pub struct DisplacementController {
    previous_mode: ControlMode,
}

impl DisplacementController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute this tick's target.
    ///
    /// `actor_position` is the base the touchpad accumulator is added to.
    /// Entering touchpad mode from another mode restarts the smoothing from
    /// zero.
    pub fn compute(
        &mut self,
        mode: ControlMode,
        anchor: Option<Vector2>,
        current: Option<Vector2>,
        actor_position: Vector2,
        episode: &mut ControlEpisode,
        config: &DisplacementConfig,
    ) -> Target {
        let previous = std::mem::replace(&mut self.previous_mode, mode);

        let (anchor, current) = match (mode, anchor, current) {
            (ControlMode::Idle, _, _) | (_, None, _) | (_, _, None) => {
                return Target::Offset(Vector2::ZERO);
            }
            (_, Some(a), Some(c)) => (a, c),
        };

        let raw = raw_displacement(anchor, current, config);
        match mode {
            ControlMode::Joystick => Target::Offset(raw),
            ControlMode::Touchpad => {
                if previous != ControlMode::Touchpad {
                    episode.accumulated_displacement = Vector2::ZERO;
                }
                episode.accumulated_displacement =
                    episode.accumulated_displacement * config.damping + raw * (1.0 - config.damping);
                Target::Absolute(actor_position + episode.accumulated_displacement)
            }
            ControlMode::Idle => Target::Offset(Vector2::ZERO),
        }
    }

    /// Forget the previous mode (called when an episode ends)
    pub fn reset(&mut self) {
        self.previous_mode = ControlMode::Idle;
    }

    pub fn previous_mode(&self) -> ControlMode {
        self.previous_mode
    }
}
