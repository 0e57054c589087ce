//! Rate-limited actor position smoothing
//!
//! Each step covers a fixed fraction of the remaining distance to the
//! target, which gives a monotonic approach without overshoot for any
//! rate in (0, 1]. Positions are clamped to the world bounds.

use crate::geometry::{Vector2, WorldBounds};

/// Actor position state
#[derive(Debug, Clone)]
pub struct PositionIntegrator {
    position: Vector2,
}

impl PositionIntegrator {
    /// Create an integrator at the given position, clamped into `bounds`
    pub fn new(initial: Vector2, bounds: &WorldBounds) -> Self {
        Self {
            position: bounds.clamp(initial),
        }
    }

    /// Advance one tick toward `target`
    ///
    /// `position += (target - position) * rate`, then each axis is clamped
    /// into the bounds. The target itself is clamped first so the approach
    /// stays monotonic when the target lies outside the world.
    pub fn step(&mut self, target: Vector2, rate: f64, bounds: &WorldBounds) -> Vector2 {
        let target = bounds.clamp(target);
        let rate = rate.clamp(0.0, 1.0);
        self.position += (target - self.position) * rate;
        self.position = bounds.clamp(self.position);
        self.position
    }

    /// Current smoothed position
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Jump to a new position (teleport), clamped into `bounds`
    pub fn reset(&mut self, position: Vector2, bounds: &WorldBounds) {
        self.position = bounds.clamp(position);
    }

    /// Check if the position is within `threshold` of `target` on both axes
    pub fn is_settled(&self, target: Vector2, threshold: f64) -> bool {
        (self.position.x - target.x).abs() < threshold && (self.position.y - target.y).abs() < threshold
    }
}
