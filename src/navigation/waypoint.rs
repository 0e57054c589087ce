//! Waypoint model
//!
//! A waypoint flagged [`Connection::Broken`] starts a new segment: it is not
//! geometrically continuous with the point before it (separate letters of a
//! glyph path, for instance).

use crate::error::ControlResult;
use crate::geometry::Vector2;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Link between a waypoint and its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    /// Continuous with the previous point ("dashed" is a drawing style only)
    #[default]
    #[serde(alias = "dashed")]
    Solid,
    /// Starts a new, disconnected segment
    #[serde(alias = "none")]
    Broken,
}

/// What reaching the waypoint means to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointRole {
    #[default]
    #[serde(alias = "waypoint", alias = "start")]
    Normal,
    Checkpoint,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(flatten)]
    pub position: Vector2,
    #[serde(default)]
    pub connection: Connection,
    #[serde(default)]
    pub role: WaypointRole,
}

impl Waypoint {
    /// Solid, normal waypoint
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            connection: Connection::Solid,
            role: WaypointRole::Normal,
        }
    }

    /// Mark this point as the start of a new segment
    pub fn broken(mut self) -> Self {
        self.connection = Connection::Broken;
        self
    }

    pub fn with_role(mut self, role: WaypointRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_broken(&self) -> bool {
        self.connection == Connection::Broken
    }
}

/// Index ranges of the segments of a path.
///
/// The first waypoint always opens segment 0, whatever its flag.
pub fn segment_ranges(waypoints: &[Waypoint]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, wp) in waypoints.iter().enumerate().skip(1) {
        if wp.is_broken() {
            ranges.push(start..i);
            start = i;
        }
    }
    if !waypoints.is_empty() {
        ranges.push(start..waypoints.len());
    }
    ranges
}

/// Length of the drawn path: solid links only, gaps before broken points skipped
pub fn drawn_length(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .filter(|pair| !pair[1].is_broken())
        .map(|pair| pair[0].position.distance(pair[1].position))
        .sum()
}

/// Load waypoints from a JSON array file
pub fn load_waypoints(path: &Path) -> ControlResult<Vec<Waypoint>> {
    let content = std::fs::read_to_string(path)?;
    let waypoints: Vec<Waypoint> = serde_json::from_str(&content)?;
    tracing::info!("Loaded {} waypoints from {}", waypoints.len(), path.display());
    Ok(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_split_on_broken() {
        let path = vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(1.0, 0.0),
            Waypoint::new(5.0, 0.0).broken(),
            Waypoint::new(6.0, 0.0),
            Waypoint::new(9.0, 0.0).broken(),
        ];
        assert_eq!(segment_ranges(&path), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn test_first_point_flag_ignored() {
        let path = vec![Waypoint::new(0.0, 0.0).broken(), Waypoint::new(1.0, 0.0)];
        assert_eq!(segment_ranges(&path), vec![0..2]);
        assert!(segment_ranges(&[]).is_empty());
    }

    #[test]
    fn test_all_broken_gives_singleton_segments() {
        let path: Vec<_> = (0..4).map(|i| Waypoint::new(i as f64, 0.0).broken()).collect();
        assert_eq!(segment_ranges(&path), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(drawn_length(&path), 0.0);
    }

    #[test]
    fn test_drawn_length_skips_gaps() {
        let path = vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(3.0, 4.0),
            Waypoint::new(100.0, 100.0).broken(),
            Waypoint::new(100.0, 110.0),
        ];
        assert!((drawn_length(&path) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_json_accepts_legacy_connection_names() {
        let waypoints: Vec<Waypoint> = serde_json::from_str(
            r#"[
                {"x": 1.0, "y": 2.0},
                {"x": 3.0, "y": 4.0, "connection": "none", "role": "checkpoint"},
                {"x": 5.0, "y": 6.0, "connection": "dashed", "role": "target"},
                {"x": 7.0, "y": 8.0, "connection": "broken", "role": "start"}
            ]"#,
        )
        .unwrap();

        assert_eq!(waypoints[0], Waypoint::new(1.0, 2.0));
        assert_eq!(waypoints[1].connection, Connection::Broken);
        assert_eq!(waypoints[1].role, WaypointRole::Checkpoint);
        assert_eq!(waypoints[2].connection, Connection::Solid);
        assert_eq!(waypoints[2].role, WaypointRole::Target);
        assert_eq!(waypoints[3].connection, Connection::Broken);
        assert_eq!(waypoints[3].role, WaypointRole::Normal);
    }

    #[test]
    fn test_load_waypoints_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("path.json");
        std::fs::write(&path, r#"[{"x": 10.0, "y": 10.0}, {"x": 20.0, "y": 10.0, "role": "target"}]"#)
            .unwrap();
        let waypoints = load_waypoints(&path).unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(waypoints[1].role, WaypointRole::Target);
    }
}
