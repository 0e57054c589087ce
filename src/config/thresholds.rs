//! Mode-switch thresholds
//!
//! The joystick threshold must stay strictly below the touchpad threshold.
//! Updates that would break the ordering move the *other* threshold by
//! [`THRESHOLD_NUDGE`] instead of swapping or rejecting the update.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};

/// Distance the non-updated threshold is moved to restore ordering
pub const THRESHOLD_NUDGE: f64 = 0.01;

/// Ordered pair of COP-distance thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdValues", into = "ThresholdValues")]
pub struct ThresholdConfig {
    joystick_threshold: f64,
    touchpad_threshold: f64,
}

/// Serialized form of [`ThresholdConfig`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdValues {
    pub joystick_threshold: f64,
    pub touchpad_threshold: f64,
}

/// Which threshold was moved to keep the ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdAdjustment {
    Touchpad { requested: f64, applied: f64 },
    Joystick { requested: f64, applied: f64 },
}

impl ThresholdConfig {
    /// Build an ordered threshold pair; both values must be finite and
    /// positive and `joystick < touchpad`.
    pub fn new(joystick_threshold: f64, touchpad_threshold: f64) -> Result<Self, ControlError> {
        if !is_valid_threshold(joystick_threshold) || !is_valid_threshold(touchpad_threshold) {
            return Err(ControlError::ConfigurationError(format!(
                "thresholds must be finite and positive (joystick={}, touchpad={})",
                joystick_threshold, touchpad_threshold
            )));
        }
        if joystick_threshold >= touchpad_threshold {
            return Err(ControlError::ConfigurationError(format!(
                "joystick_threshold ({}) must be below touchpad_threshold ({})",
                joystick_threshold, touchpad_threshold
            )));
        }
        Ok(Self {
            joystick_threshold,
            touchpad_threshold,
        })
    }

    pub fn joystick(&self) -> f64 {
        self.joystick_threshold
    }

    pub fn touchpad(&self) -> f64 {
        self.touchpad_threshold
    }

    /// Apply new threshold values, restoring the ordering if needed.
    ///
    /// When the joystick threshold is part of the update (alone or together
    /// with the touchpad threshold) the touchpad threshold yields; when only
    /// the touchpad threshold changes, the joystick threshold yields. Callers
    /// must pass values accepted by [`is_valid_threshold`].
    pub fn update(&mut self, joystick: Option<f64>, touchpad: Option<f64>) -> Option<ThresholdAdjustment> {
        let mut next_joystick = joystick.unwrap_or(self.joystick_threshold);
        let mut next_touchpad = touchpad.unwrap_or(self.touchpad_threshold);
        let mut adjustment = None;

        if next_joystick >= next_touchpad {
            match joystick.is_some().then(|| nudge_up(next_joystick)).flatten() {
                Some(raised) => {
                    adjustment = Some(ThresholdAdjustment::Touchpad {
                        requested: next_touchpad,
                        applied: raised,
                    });
                    next_touchpad = raised;
                }
                None => {
                    // joystick at f64::MAX: touchpad takes its place instead
                    if joystick.is_some() {
                        next_touchpad = next_joystick;
                    }
                    let applied = nudge_down(next_touchpad);
                    adjustment = Some(ThresholdAdjustment::Joystick {
                        requested: next_joystick,
                        applied,
                    });
                    next_joystick = applied;
                }
            }
        }

        self.joystick_threshold = next_joystick;
        self.touchpad_threshold = next_touchpad;
        adjustment
    }
}

/// `value` plus the nudge, or the next float up when the nudge is lost to
/// rounding. `None` above `f64::MAX`.
fn nudge_up(value: f64) -> Option<f64> {
    let next = value + THRESHOLD_NUDGE;
    let next = if next > value {
        next
    } else {
        f64::from_bits(value.to_bits() + 1)
    };
    next.is_finite().then_some(next)
}

/// Positive value strictly below `value` (`value` must be positive)
fn nudge_down(value: f64) -> f64 {
    let next = value - THRESHOLD_NUDGE;
    if next <= 0.0 {
        value / 2.0
    } else if next < value {
        next
    } else {
        f64::from_bits(value.to_bits() - 1)
    }
}

/// Thresholds must be finite and strictly positive
pub fn is_valid_threshold(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            joystick_threshold: 0.05,
            touchpad_threshold: 0.12,
        }
    }
}

impl TryFrom<ThresholdValues> for ThresholdConfig {
    type Error = ControlError;

    fn try_from(values: ThresholdValues) -> Result<Self, Self::Error> {
        Self::new(values.joystick_threshold, values.touchpad_threshold)
    }
}

impl From<ThresholdConfig> for ThresholdValues {
    fn from(config: ThresholdConfig) -> Self {
        Self {
            joystick_threshold: config.joystick_threshold,
            touchpad_threshold: config.touchpad_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_unordered() {
        assert!(ThresholdConfig::new(0.2, 0.1).is_err());
        assert!(ThresholdConfig::new(0.1, 0.1).is_err());
        assert!(ThresholdConfig::new(0.0, 0.1).is_err());
        assert!(ThresholdConfig::new(0.05, f64::INFINITY).is_err());
        assert!(ThresholdConfig::new(0.05, 0.12).is_ok());
    }

    #[test]
    fn test_raising_joystick_nudges_touchpad() {
        let mut t = ThresholdConfig::default();
        let adj = t.update(Some(0.5), None);
        assert!(matches!(adj, Some(ThresholdAdjustment::Touchpad { .. })));
        assert_eq!(t.joystick(), 0.5);
        assert!((t.touchpad() - (0.5 + THRESHOLD_NUDGE)).abs() < 1e-12);
    }

    #[test]
    fn test_lowering_touchpad_nudges_joystick() {
        let mut t = ThresholdConfig::default();
        let adj = t.update(None, Some(0.04));
        assert!(matches!(adj, Some(ThresholdAdjustment::Joystick { .. })));
        assert_eq!(t.touchpad(), 0.04);
        assert!((t.joystick() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_touchpad_keeps_joystick_positive() {
        let mut t = ThresholdConfig::default();
        t.update(None, Some(0.004));
        assert!(t.joystick() > 0.0);
        assert!(t.joystick() < t.touchpad());
    }

    #[test]
    fn test_equal_pair_is_not_swapped() {
        let mut t = ThresholdConfig::default();
        let adj = t.update(Some(0.3), Some(0.3));
        assert!(adj.is_some());
        assert_eq!(t.joystick(), 0.3, "joystick value must be kept as requested");
        assert!(t.touchpad() > t.joystick());
    }

    #[test]
    fn test_ordering_holds_for_any_update_sequence() {
        let mut t = ThresholdConfig::default();
        let values = [0.01, 0.05, 0.12, 3.0, 10.0, 0.5, 0.001, 7.5, 1e15, 1e300, f64::MAX / 2.0, f64::MAX];
        for (i, &a) in values.iter().enumerate() {
            for &b in &values[i..] {
                t.update(Some(a), None);
                assert!(t.joystick() < t.touchpad());
                t.update(None, Some(b));
                assert!(t.joystick() < t.touchpad());
                t.update(Some(b), Some(a));
                assert!(t.joystick() < t.touchpad());
            }
        }
    }

    #[test]
    fn test_large_thresholds_stay_ordered() {
        let mut t = ThresholdConfig::default();
        let adj = t.update(Some(1e15), None);
        assert!(matches!(adj, Some(ThresholdAdjustment::Touchpad { .. })));
        assert_eq!(t.joystick(), 1e15);
        assert!(t.touchpad() > 1e15, "nudge lost to rounding: {}", t.touchpad());

        let mut t = ThresholdConfig::default();
        t.update(Some(1.0), None);
        t.update(None, Some(1e17));
        t.update(Some(2e17), None);
        t.update(None, Some(2e17));
        assert!(t.joystick() < t.touchpad());
        assert!(t.joystick() > 0.0);

        let mut t = ThresholdConfig::default();
        let adj = t.update(Some(f64::MAX), None);
        assert!(matches!(adj, Some(ThresholdAdjustment::Joystick { .. })));
        assert!(t.touchpad().is_finite());
        assert!(t.joystick() < t.touchpad());
    }

    #[test]
    fn test_serde_rejects_unordered_file_values() {
        let ok: ThresholdConfig =
            serde_json::from_str(r#"{"joystick_threshold":0.05,"touchpad_threshold":0.08}"#).unwrap();
        assert_eq!(ok.touchpad(), 0.08);

        let bad = serde_json::from_str::<ThresholdConfig>(
            r#"{"joystick_threshold":10.0,"touchpad_threshold":0.08}"#,
        );
        assert!(bad.is_err());
    }
}
