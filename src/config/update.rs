//! Runtime parameter updates
//!
//! A [`ParameterUpdate`] carries any subset of the live-tunable parameters.
//! It is applied as a unit: every field is checked, accepted fields are
//! written to a copy of the config, threshold ordering is restored, and only
//! then is the copy committed.

use crate::config::thresholds::{is_valid_threshold, ThresholdAdjustment};
use crate::config::ControlConfig;
use serde::{Deserialize, Serialize};

/// Partial configuration update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterUpdate {
    pub pressure_threshold: Option<f64>,
    pub min_contact_area: Option<usize>,
    pub joystick_threshold: Option<f64>,
    pub touchpad_threshold: Option<f64>,
    pub sensitivity: Option<f64>,
    pub damping: Option<f64>,
    pub max_range: Option<f64>,
    pub integrator_rate: Option<f64>,
}

/// Outcome of applying a [`ParameterUpdate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterReport {
    /// Names of fields written to the config
    pub applied: Vec<&'static str>,
    /// Fields left unchanged, with the reason
    pub rejected: Vec<(&'static str, String)>,
    /// Set when a threshold was moved to keep the ordering
    pub threshold_adjustment: Option<ThresholdAdjustment>,
}

impl ParameterReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.threshold_adjustment.is_none()
    }
}

pub(crate) fn is_valid_sensitivity(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn is_valid_damping(value: f64) -> bool {
    value.is_finite() && (0.0..1.0).contains(&value)
}

pub(crate) fn is_valid_max_range(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn is_valid_rate(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 1.0
}

fn is_valid_pressure_threshold(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl ParameterUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ParameterUpdate::default()
    }

    /// Apply the update to `config`.
    ///
    /// Invalid values are skipped with a warning; the rest of the update
    /// still goes through. `config` is only written once all checks pass.
    pub fn apply_to(&self, config: &mut ControlConfig) -> ParameterReport {
        let mut next = config.clone();
        let mut report = ParameterReport::default();

        fn check<T: Copy + std::fmt::Debug>(
            report: &mut ParameterReport,
            name: &'static str,
            value: Option<T>,
            valid: impl Fn(T) -> bool,
            requirement: &str,
        ) -> Option<T> {
            let value = value?;
            if valid(value) {
                report.applied.push(name);
                Some(value)
            } else {
                tracing::warn!("Rejected parameter {}={:?}: {}", name, value, requirement);
                report.rejected.push((name, format!("{:?} is invalid: {}", value, requirement)));
                None
            }
        }

        if let Some(v) = check(
            &mut report,
            "pressure_threshold",
            self.pressure_threshold,
            is_valid_pressure_threshold,
            "must be finite and >= 0",
        ) {
            next.detection.pressure_threshold = v;
        }
        if let Some(v) = check(&mut report, "min_contact_area", self.min_contact_area, |_| true, "") {
            next.detection.min_contact_area = v;
        }
        if let Some(v) = check(
            &mut report,
            "sensitivity",
            self.sensitivity,
            is_valid_sensitivity,
            "must be finite and > 0",
        ) {
            next.displacement.sensitivity = v;
        }
        if let Some(v) = check(&mut report, "damping", self.damping, is_valid_damping, "must be in [0, 1)") {
            next.displacement.damping = v;
        }
        if let Some(v) = check(
            &mut report,
            "max_range",
            self.max_range,
            is_valid_max_range,
            "must be finite and > 0",
        ) {
            next.displacement.max_range = v;
        }
        if let Some(v) = check(
            &mut report,
            "integrator_rate",
            self.integrator_rate,
            is_valid_rate,
            "must be in (0, 1]",
        ) {
            next.integrator.rate = v;
        }

        let joystick = check(
            &mut report,
            "joystick_threshold",
            self.joystick_threshold,
            is_valid_threshold,
            "must be finite and > 0",
        );
        let touchpad = check(
            &mut report,
            "touchpad_threshold",
            self.touchpad_threshold,
            is_valid_threshold,
            "must be finite and > 0",
        );
        if joystick.is_some() || touchpad.is_some() {
            report.threshold_adjustment = next.thresholds.update(joystick, touchpad);
            if let Some(adjustment) = report.threshold_adjustment {
                tracing::warn!(
                    "Threshold update would break ordering, adjusted: {:?} (joystick={}, touchpad={})",
                    adjustment,
                    next.thresholds.joystick(),
                    next.thresholds.touchpad()
                );
            }
        }

        *config = next;
        if !report.applied.is_empty() {
            tracing::info!("Parameters updated: {:?}", report.applied);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut config = ControlConfig::default();
        let report = ParameterUpdate::default().apply_to(&mut config);
        assert_eq!(config, ControlConfig::default());
        assert!(report.applied.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_subset_update() {
        let mut config = ControlConfig::default();
        let update = ParameterUpdate {
            sensitivity: Some(2.0),
            integrator_rate: Some(0.5),
            ..Default::default()
        };
        let report = update.apply_to(&mut config);
        assert_eq!(config.displacement.sensitivity, 2.0);
        assert_eq!(config.integrator.rate, 0.5);
        assert_eq!(config.displacement.damping, 0.3);
        assert_eq!(report.applied, vec!["sensitivity", "integrator_rate"]);
    }

    #[test]
    fn test_invalid_fields_rejected_individually() {
        let mut config = ControlConfig::default();
        let update = ParameterUpdate {
            damping: Some(1.5),
            max_range: Some(f64::NAN),
            min_contact_area: Some(12),
            ..Default::default()
        };
        let report = update.apply_to(&mut config);
        assert_eq!(config.displacement.damping, 0.3);
        assert_eq!(config.displacement.max_range, 20.0);
        assert_eq!(config.detection.min_contact_area, 12);
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn test_threshold_update_never_leaves_unordered() {
        let mut config = ControlConfig::default();
        let update = ParameterUpdate {
            joystick_threshold: Some(10.0),
            ..Default::default()
        };
        let report = update.apply_to(&mut config);
        assert!(report.threshold_adjustment.is_some());
        assert!(config.thresholds.joystick() < config.thresholds.touchpad());

        let update = ParameterUpdate {
            joystick_threshold: Some(0.2),
            touchpad_threshold: Some(0.2),
            ..Default::default()
        };
        update.apply_to(&mut config);
        assert!(config.thresholds.joystick() < config.thresholds.touchpad());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let ok: ParameterUpdate = serde_json::from_str(r#"{"damping": 0.5}"#).unwrap();
        assert_eq!(ok.damping, Some(0.5));
        assert!(serde_json::from_str::<ParameterUpdate>(r#"{"colormap": "jet"}"#).is_err());
    }
}
