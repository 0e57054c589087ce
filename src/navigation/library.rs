//! Named path presets and user-defined paths

use crate::error::{ControlError, ControlResult};
use crate::navigation::waypoint::{Waypoint, WaypointRole};
use std::collections::BTreeMap;

/// Collection of named waypoint lists
#[derive(Debug, Clone, Default)]
pub struct PathLibrary {
    paths: BTreeMap<String, Vec<Waypoint>>,
}

impl PathLibrary {
    /// An empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding the built-in presets (64×64 sensor world)
    pub fn with_presets() -> Self {
        let mut library = Self::new();

        library.insert(
            "straight-line",
            vec![
                Waypoint::new(20.0, 32.0),
                Waypoint::new(32.0, 32.0).with_role(WaypointRole::Target),
            ],
        );

        library.insert(
            "l-shape",
            vec![
                Waypoint::new(15.0, 15.0),
                Waypoint::new(15.0, 32.0),
                Waypoint::new(32.0, 32.0).with_role(WaypointRole::Target),
            ],
        );

        library.insert(
            "zigzag",
            vec![
                Waypoint::new(10.0, 10.0),
                Waypoint::new(30.0, 15.0),
                Waypoint::new(15.0, 25.0),
                Waypoint::new(35.0, 30.0),
                Waypoint::new(32.0, 32.0).with_role(WaypointRole::Target),
            ],
        );

        let circle = (0..8)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 8.0;
                let wp = Waypoint::new(32.0 + 15.0 * angle.cos(), 32.0 + 15.0 * angle.sin());
                if i == 7 {
                    wp.with_role(WaypointRole::Target)
                } else {
                    wp
                }
            })
            .collect();
        library.insert("circle", circle);

        let mut precision = vec![Waypoint::new(8.0, 8.0)];
        precision.extend(
            [(16.0, 8.0), (24.0, 16.0), (32.0, 24.0), (40.0, 32.0), (48.0, 40.0), (56.0, 48.0)]
                .into_iter()
                .map(|(x, y)| Waypoint::new(x, y).with_role(WaypointRole::Checkpoint)),
        );
        precision.push(Waypoint::new(32.0, 32.0).with_role(WaypointRole::Target));
        library.insert("precision", precision);

        // "HI": each stroke is its own segment
        library.insert(
            "letters-hi",
            vec![
                Waypoint::new(14.0, 16.0),
                Waypoint::new(14.0, 32.0),
                Waypoint::new(14.0, 48.0).with_role(WaypointRole::Checkpoint),
                Waypoint::new(30.0, 16.0).broken(),
                Waypoint::new(30.0, 32.0),
                Waypoint::new(30.0, 48.0).with_role(WaypointRole::Checkpoint),
                Waypoint::new(14.0, 32.0).broken(),
                Waypoint::new(22.0, 32.0),
                Waypoint::new(30.0, 32.0).with_role(WaypointRole::Checkpoint),
                Waypoint::new(46.0, 16.0).broken(),
                Waypoint::new(46.0, 32.0),
                Waypoint::new(46.0, 48.0).with_role(WaypointRole::Target),
            ],
        );

        tracing::debug!("Loaded {} preset paths", library.paths.len());
        library
    }

    /// Add or replace a path
    pub fn insert(&mut self, name: impl Into<String>, waypoints: Vec<Waypoint>) {
        self.paths.insert(name.into(), waypoints);
    }

    /// Create a solid path through `points`; the last point is the target
    pub fn create_custom(&mut self, name: &str, points: &[(f64, f64)]) -> Vec<Waypoint> {
        let last = points.len().saturating_sub(1);
        let waypoints: Vec<Waypoint> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let wp = Waypoint::new(x, y);
                if i == last {
                    wp.with_role(WaypointRole::Target)
                } else {
                    wp
                }
            })
            .collect();

        tracing::info!("Created custom path '{}' ({} points)", name, waypoints.len());
        self.insert(name, waypoints.clone());
        waypoints
    }

    /// Waypoints of a named path
    pub fn get(&self, name: &str) -> ControlResult<Vec<Waypoint>> {
        self.paths
            .get(name)
            .cloned()
            .ok_or_else(|| ControlError::UnknownPath(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.paths.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
