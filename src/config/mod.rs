//! Configuration Management
//!
//! All tunables of the control core live in [`ControlConfig`]. A config is
//! loaded once at startup (JSON); runtime changes go exclusively through
//! [`ParameterUpdate`] so thresholds are never mutated behind the loop's back.

pub mod thresholds;
pub mod update;

pub use thresholds::{ThresholdAdjustment, ThresholdConfig, THRESHOLD_NUDGE};
pub use update::{ParameterReport, ParameterUpdate};

use crate::error::{ControlError, ControlResult};
use crate::geometry::{Vector2, WorldBounds};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ControlConfig {
    /// Contact detection settings
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Mode-switch thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Joystick / touchpad displacement tunables
    #[serde(default)]
    pub displacement: DisplacementConfig,
    /// Actor position smoothing
    #[serde(default)]
    pub integrator: IntegratorConfig,
    /// Actor world
    #[serde(default)]
    pub world: WorldConfig,
    /// Path tracking
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Async runner
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Contact detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Readings strictly above this count as contact cells
    pub pressure_threshold: f64,
    /// Minimum number of contact cells for a frame to count as touched
    pub min_contact_area: usize,
}

/// Displacement controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementConfig {
    /// Gain applied to the anchor-to-COP vector
    pub sensitivity: f64,
    /// Touchpad smoothing factor in [0, 1)
    pub damping: f64,
    /// Maximum length of the displacement vector (grid units)
    pub max_range: f64,
}

/// Position integrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Fraction of the remaining distance covered per tick, in (0, 1]
    pub rate: f64,
}

/// Actor world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub bounds: WorldBounds,
    /// Actor position at startup and after a reset
    pub actor_start: Vector2,
}

/// Path tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Distance at which a waypoint counts as reached
    pub proximity_radius: f64,
}

/// Async runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Control tick period in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pressure_threshold: 0.01,
            min_contact_area: 5,
        }
    }
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.2,
            damping: 0.3,
            max_range: 20.0,
        }
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self { rate: 0.15 }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            actor_start: Vector2::new(32.0, 32.0),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            proximity_radius: 5.0,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
        }
    }
}

impl ControlConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> ControlResult<()> {
        let invalid = |msg: String| -> ControlResult<()> { Err(ControlError::ConfigurationError(msg)) };

        if !self.detection.pressure_threshold.is_finite() || self.detection.pressure_threshold < 0.0 {
            return invalid(format!(
                "detection.pressure_threshold must be finite and >= 0, got {}",
                self.detection.pressure_threshold
            ));
        }
        if !update::is_valid_sensitivity(self.displacement.sensitivity) {
            return invalid(format!(
                "displacement.sensitivity must be finite and > 0, got {}",
                self.displacement.sensitivity
            ));
        }
        if !update::is_valid_damping(self.displacement.damping) {
            return invalid(format!(
                "displacement.damping must be in [0, 1), got {}",
                self.displacement.damping
            ));
        }
        if !update::is_valid_max_range(self.displacement.max_range) {
            return invalid(format!(
                "displacement.max_range must be finite and > 0, got {}",
                self.displacement.max_range
            ));
        }
        if !update::is_valid_rate(self.integrator.rate) {
            return invalid(format!("integrator.rate must be in (0, 1], got {}", self.integrator.rate));
        }
        if !self.world.bounds.is_valid() {
            return invalid(format!("world.bounds are not a valid rectangle: {:?}", self.world.bounds));
        }
        if !self.world.bounds.contains(self.world.actor_start) {
            return invalid(format!(
                "world.actor_start {:?} lies outside the world bounds",
                self.world.actor_start
            ));
        }
        if !self.navigation.proximity_radius.is_finite() || self.navigation.proximity_radius < 0.0 {
            return invalid(format!(
                "navigation.proximity_radius must be finite and >= 0, got {}",
                self.navigation.proximity_radius
            ));
        }
        if self.runner.tick_interval_ms == 0 {
            return invalid("runner.tick_interval_ms must be > 0".to_string());
        }
        Ok(())
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ControlConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> ControlResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Write the config as pretty-printed JSON
    pub fn save(&self, path: &Path) -> ControlResult<()> {
        let data = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
