//! Center-of-pressure estimation

use crate::geometry::Vector2;
use crate::sensing::frame::PressureFrame;

/// Pressure-weighted centroid of the cells above `pressure_threshold`.
///
/// Coordinates are grid indices (column = x, row = y), fractional because of
/// the weighting. Returns `None` when no cell passes the threshold, when the
/// total passing pressure is not positive, or when the frame is malformed.
pub fn estimate_cop(frame: &PressureFrame, pressure_threshold: f64) -> Option<Vector2> {
    if frame.validate().is_err() {
        return None;
    }
    weighted_centroid(frame, pressure_threshold)
}

/// Centroid of a frame that already passed validation
pub(crate) fn weighted_centroid(frame: &PressureFrame, pressure_threshold: f64) -> Option<Vector2> {
    let mut total = 0.0f64;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    for (x, y, p) in frame.cells() {
        if p > pressure_threshold {
            total += p;
            sum_x += x as f64 * p;
            sum_y += y as f64 * p;
        }
    }

    if total <= 0.0 {
        return None;
    }

    Some(Vector2::new(sum_x / total, sum_y / total))
}
