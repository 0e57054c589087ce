//! Pressure frame container
//!
//! A frame is a row-major grid of non-negative pressure readings. Frames can
//! arrive from untrusted producers (replay files, drivers), so the type keeps
//! its raw fields public and offers [`PressureFrame::validate`] instead of
//! refusing to represent malformed data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a frame cannot be processed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("frame has a zero dimension ({width}x{height})")]
    Empty { width: usize, height: usize },

    #[error("frame declares {width}x{height} cells but carries {actual} values")]
    SizeMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("frame is {actual_width}x{actual_height}, session expects {expected_width}x{expected_height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("frame rows have unequal lengths")]
    RaggedRows,

    #[error("cell {index} holds an invalid reading ({value})")]
    InvalidValue { index: usize, value: f64 },
}

/// One sample of the pressure sensor grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureFrame {
    pub width: usize,
    pub height: usize,
    /// Row-major readings, `values[y * width + x]`
    pub values: Vec<f64>,
}

impl PressureFrame {
    /// Build a frame from row-major values, checking the shape and readings
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Result<Self, FrameError> {
        let frame = Self {
            width,
            height,
            values,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Build a frame from a list of rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FrameError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != width) {
            return Err(FrameError::RaggedRows);
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// An all-zero frame. Dimensions whose product overflows yield a frame
    /// without values, which fails [`PressureFrame::validate`].
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width.checked_mul(height).unwrap_or(0)],
        }
    }

    /// Check dimensions and readings
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::Empty {
                width: self.width,
                height: self.height,
            });
        }
        if self.width.checked_mul(self.height) != Some(self.values.len()) {
            return Err(FrameError::SizeMismatch {
                width: self.width,
                height: self.height,
                actual: self.values.len(),
            });
        }
        if let Some((index, &value)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(FrameError::InvalidValue { index, value });
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Reading at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.index(x, y).and_then(|i| self.values.get(i)).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        if let Some(cell) = self.index(x, y).and_then(|i| self.values.get_mut(i)) {
            *cell = value;
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        y.checked_mul(self.width)?.checked_add(x)
    }

    /// Iterate `(x, y, value)` over every cell
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let width = self.width.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % width, i / width, v))
    }
}
