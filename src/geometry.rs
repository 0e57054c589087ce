//! Planar vector math shared by the sensing, control and navigation layers
//!
//! All coordinates are in sensor-grid units: (0, 0) is the top-left cell,
//! X grows to the right and Y grows downward.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 2D vector / point in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Vector2) -> f64 {
        (other - self).length()
    }

    /// Scale the vector down so its length does not exceed `max_len`.
    ///
    /// Vectors already within the limit are returned unchanged, so applying
    /// the clamp twice gives the same result as applying it once.
    pub fn clamp_length(self, max_len: f64) -> Self {
        let len = self.length();
        if len > max_len && len > 0.0 {
            self * (max_len / len)
        } else {
            self
        }
    }

    /// Direction of the vector in degrees, normalised to `[0, 360)`.
    ///
    /// 0° points right (+X), 90° points down (+Y).
    pub fn angle_degrees(self) -> f64 {
        self.y.atan2(self.x).to_degrees().rem_euclid(360.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle the actor is confined to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vector2,
    pub max: Vector2,
}

impl WorldBounds {
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Clamp each axis of `point` into `[min, max]`
    pub fn clamp(&self, point: Vector2) -> Vector2 {
        Vector2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Bounds are usable when both corners are finite and min ≤ max on each axis
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Vector2::new(5.0, 5.0),
            max: Vector2::new(59.0, 59.0),
        }
    }
}
