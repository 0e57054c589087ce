//! Control mode arbitration

use crate::config::ThresholdConfig;
use crate::geometry::Vector2;
use serde::{Deserialize, Serialize};

/// Absorbs floating-point noise at exact threshold boundaries
pub const BOUNDARY_EPSILON: f64 = 1e-10;

/// How finger movement is turned into actor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// No movement
    #[default]
    Idle,
    /// Offset proportional to the anchor distance, recomputed every tick
    Joystick,
    /// Smoothed, accumulating offset
    Touchpad,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlMode::Idle => write!(f, "idle"),
            ControlMode::Joystick => write!(f, "joystick"),
            ControlMode::Touchpad => write!(f, "touchpad"),
        }
    }
}

/// Mode plus the anchor distance it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeDecision {
    pub mode: ControlMode,
    pub distance: f64,
}

/// Classify the anchor-to-current COP distance.
///
/// Missing anchor or COP (including "no active episode") yields
/// `Idle` at distance 0.
pub fn arbitrate_mode(
    anchor: Option<Vector2>,
    current: Option<Vector2>,
    thresholds: &ThresholdConfig,
) -> ModeDecision {
    let (anchor, current) = match (anchor, current) {
        (Some(a), Some(c)) => (a, c),
        _ => {
            return ModeDecision {
                mode: ControlMode::Idle,
                distance: 0.0,
            }
        }
    };

    let distance = anchor.distance(current);
    ModeDecision {
        mode: classify_distance(distance, thresholds),
        distance,
    }
}

/// Map a distance to a mode using the ordered thresholds
pub fn classify_distance(distance: f64, thresholds: &ThresholdConfig) -> ControlMode {
    if distance < thresholds.joystick() - BOUNDARY_EPSILON {
        ControlMode::Idle
    } else if distance < thresholds.touchpad() - BOUNDARY_EPSILON {
        ControlMode::Joystick
    } else {
        ControlMode::Touchpad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_example_is_touchpad() {
        let thresholds = ThresholdConfig::new(0.05, 0.12).unwrap();
        let decision = arbitrate_mode(
            Some(Vector2::new(32.0, 32.0)),
            Some(Vector2::new(37.0, 32.0)),
            &thresholds,
        );
        assert!((decision.distance - 5.0).abs() < 1e-12);
        assert_eq!(decision.mode, ControlMode::Touchpad);
    }

    #[test]
    fn test_bands() {
        let thresholds = ThresholdConfig::new(1.0, 3.0).unwrap();
        for d in [0.0, 0.5, 0.999] {
            assert_eq!(classify_distance(d, &thresholds), ControlMode::Idle, "d={}", d);
        }
        for d in [1.0, 2.0, 2.999] {
            assert_eq!(classify_distance(d, &thresholds), ControlMode::Joystick, "d={}", d);
        }
        for d in [3.0, 3.5, 100.0] {
            assert_eq!(classify_distance(d, &thresholds), ControlMode::Touchpad, "d={}", d);
        }
    }

    #[test]
    fn test_exact_boundary_with_float_noise() {
        let thresholds = ThresholdConfig::new(0.1, 0.3).unwrap();
        // 0.1 + 0.2 is 0.30000000000000004, 0.3 - 0.1 - 0.1 is just under 0.1
        let anchor = Vector2::new(0.0, 0.0);
        let d = Vector2::new(0.3 - 0.1 - 0.1, 0.0);
        assert_eq!(
            arbitrate_mode(Some(anchor), Some(d), &thresholds).mode,
            ControlMode::Joystick
        );
    }

    #[test]
    fn test_missing_cop_is_idle() {
        let thresholds = ThresholdConfig::default();
        let decision = arbitrate_mode(None, Some(Vector2::new(1.0, 1.0)), &thresholds);
        assert_eq!(decision.mode, ControlMode::Idle);
        assert_eq!(decision.distance, 0.0);

        let decision = arbitrate_mode(Some(Vector2::new(1.0, 1.0)), None, &thresholds);
        assert_eq!(decision.mode, ControlMode::Idle);
        assert_eq!(decision.distance, 0.0);
    }
}
