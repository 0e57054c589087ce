//! Contact detection
//!
//! Classifies a frame as touched / untouched by thresholding every cell and
//! counting the cells that pass.

use crate::config::DetectionConfig;
use crate::sensing::frame::PressureFrame;
use serde::{Deserialize, Serialize};

/// Per-frame contact summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactState {
    /// Whether the contact area reached the configured minimum
    pub in_contact: bool,
    /// Number of cells above the pressure threshold
    pub area: usize,
    /// Largest reading above the threshold, 0 when no cell passes
    pub peak_pressure: f64,
}

impl ContactState {
    /// State reported for frames without any usable contact
    pub fn none() -> Self {
        Self::default()
    }
}

/// Detect contact in a frame
///
/// Malformed frames are reported as "no contact" rather than an error so a
/// single bad sample cannot stall the control loop.
pub fn detect_contact(frame: &PressureFrame, config: &DetectionConfig) -> ContactState {
    if let Err(e) = frame.validate() {
        tracing::trace!("Treating malformed frame as no contact: {}", e);
        return ContactState::none();
    }
    measure_contact(frame, config)
}

/// Contact summary of a frame that already passed validation
pub(crate) fn measure_contact(frame: &PressureFrame, config: &DetectionConfig) -> ContactState {
    let mut area = 0usize;
    let mut peak = 0.0f64;
    for &value in &frame.values {
        if value > config.pressure_threshold {
            area += 1;
            peak = peak.max(value);
        }
    }

    ContactState {
        in_contact: area >= config.min_contact_area,
        area,
        peak_pressure: peak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DetectionConfig {
        DetectionConfig {
            pressure_threshold: 0.01,
            min_contact_area: 3,
        }
    }

    #[test]
    fn test_all_below_threshold_is_not_contact() {
        let frame = PressureFrame::new(4, 4, vec![0.005; 16]).unwrap();
        let state = detect_contact(&frame, &config());
        assert!(!state.in_contact);
        assert_eq!(state.area, 0);
        assert_eq!(state.peak_pressure, 0.0);
    }

    #[test]
    fn test_area_and_peak() {
        let mut frame = PressureFrame::zeros(4, 4);
        frame.set(1, 1, 0.2);
        frame.set(2, 1, 0.5);
        frame.set(1, 2, 0.3);
        let state = detect_contact(&frame, &config());
        assert!(state.in_contact);
        assert_eq!(state.area, 3);
        assert_eq!(state.peak_pressure, 0.5);
    }

    #[test]
    fn test_small_area_below_minimum() {
        let mut frame = PressureFrame::zeros(4, 4);
        frame.set(0, 0, 0.9);
        frame.set(3, 3, 0.9);
        let state = detect_contact(&frame, &config());
        assert!(!state.in_contact, "two cells should not reach min area of 3");
        assert_eq!(state.area, 2);
        assert_eq!(state.peak_pressure, 0.9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let frame = PressureFrame::new(2, 2, vec![0.01; 4]).unwrap();
        let state = detect_contact(&frame, &config());
        assert_eq!(state.area, 0, "cells equal to the threshold do not count");
    }

    #[test]
    fn test_malformed_frame_reports_no_contact() {
        let frame = PressureFrame {
            width: 8,
            height: 8,
            values: vec![1.0; 10],
        };
        assert_eq!(detect_contact(&frame, &config()), ContactState::none());
    }
}
