//! Path progress tracking
//!
//! The tracker walks the waypoint list in order: the actor starts at
//! waypoint 0 and advances one waypoint per tick whenever it comes within
//! the proximity radius of the next one. It only reports what happened as
//! [`PathEvent`]s; reacting to them is up to the consumer.

use crate::geometry::Vector2;
use crate::navigation::waypoint::{drawn_length, segment_ranges, Waypoint, WaypointRole};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Progress along a loaded path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathState {
    name: String,
    waypoints: Vec<Waypoint>,
    segments: Vec<Range<usize>>,
    current_index: usize,
    current_segment_index: usize,
    progress_fraction: f64,
    is_completed: bool,
}

/// Something the tracker observed this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathEvent {
    /// The actor reached waypoint `index`
    WaypointReached { index: usize, role: WaypointRole },
    /// The reached waypoint carries the `Target` role
    TargetReached { index: usize },
    /// The last waypoint of segment `segment` was reached
    SegmentCompleted { segment: usize },
    /// The last waypoint of the path was reached
    PathCompleted,
}

/// Guidance toward the next waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationInfo {
    pub next_index: Option<usize>,
    pub next_position: Option<Vector2>,
    pub distance_to_next: f64,
    /// 0° = right, 90° = down
    pub direction_degrees: f64,
    pub direction_vector: Vector2,
    /// Drawn length of the whole path (solid links only)
    pub total_length: f64,
    /// Distance to the next waypoint plus the drawn length after it
    pub remaining_length: f64,
    pub segment_count: usize,
}

impl PathState {
    /// Start a new path at waypoint 0
    pub fn new(name: impl Into<String>, waypoints: Vec<Waypoint>) -> Self {
        let segments = segment_ranges(&waypoints);
        let mut state = Self {
            name: name.into(),
            waypoints,
            segments,
            current_index: 0,
            current_segment_index: 0,
            progress_fraction: 0.0,
            is_completed: false,
        };
        state.refresh();
        state
    }

    /// Return to waypoint 0
    pub fn reset_progress(&mut self) {
        self.current_index = 0;
        self.refresh();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn segments(&self) -> &[Range<usize>] {
        &self.segments
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    pub fn progress_fraction(&self) -> f64 {
        self.progress_fraction
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Index of the waypoint the actor is heading to
    pub fn next_index(&self) -> Option<usize> {
        let next = self.current_index + 1;
        (next < self.waypoints.len()).then_some(next)
    }

    /// Whether every waypoint of segment `segment` has been reached
    pub fn is_segment_completed(&self, segment: usize) -> bool {
        self.segments
            .get(segment)
            .map(|range| self.current_index + 1 >= range.end)
            .unwrap_or(false)
    }

    fn segment_of(&self, index: usize) -> usize {
        self.segments
            .iter()
            .position(|range| range.contains(&index))
            .unwrap_or(0)
    }

    fn refresh(&mut self) {
        let len = self.waypoints.len();
        if len <= 1 {
            self.current_index = 0;
            self.current_segment_index = 0;
            self.progress_fraction = 1.0;
            self.is_completed = true;
            return;
        }
        let last = len - 1;
        self.progress_fraction = self.current_index as f64 / last as f64;
        self.is_completed = self.current_index == last;
        self.current_segment_index = match self.next_index() {
            Some(next) => self.segment_of(next),
            None => self.segments.len().saturating_sub(1),
        };
    }

    /// Navigation guidance from `actor` to the next waypoint
    pub fn navigation(&self, actor: Vector2) -> NavigationInfo {
        let total_length = drawn_length(&self.waypoints);
        let segment_count = self.segments.len();

        match self.next_index() {
            Some(next) => {
                let next_position = self.waypoints[next].position;
                let direction_vector = next_position - actor;
                let distance_to_next = direction_vector.length();
                NavigationInfo {
                    next_index: Some(next),
                    next_position: Some(next_position),
                    distance_to_next,
                    direction_degrees: direction_vector.angle_degrees(),
                    direction_vector,
                    total_length,
                    remaining_length: distance_to_next + drawn_length(&self.waypoints[next..]),
                    segment_count,
                }
            }
            None => NavigationInfo {
                next_index: None,
                next_position: None,
                distance_to_next: 0.0,
                direction_degrees: 0.0,
                direction_vector: Vector2::ZERO,
                total_length,
                remaining_length: 0.0,
                segment_count,
            },
        }
    }
}

/// Advances [`PathState`] from the actor position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProgressTracker {
    /// Distance at which the next waypoint counts as reached
    pub proximity_radius: f64,
}

impl PathProgressTracker {
    pub fn new(proximity_radius: f64) -> Self {
        Self { proximity_radius }
    }

    /// Check the next waypoint against the actor position and advance at
    /// most one waypoint.
    pub fn update(&self, state: &mut PathState, actor: Vector2) -> Vec<PathEvent> {
        let mut events = Vec::new();
        let Some(next) = state.next_index() else {
            return events;
        };

        let waypoint = state.waypoints[next];
        if waypoint.position.distance(actor) > self.proximity_radius {
            return events;
        }

        state.current_index = next;
        let segment = state.segment_of(next);
        state.refresh();

        tracing::debug!(
            "Waypoint {} reached on path '{}' (progress={:.2})",
            next,
            state.name,
            state.progress_fraction
        );

        events.push(PathEvent::WaypointReached {
            index: next,
            role: waypoint.role,
        });
        if waypoint.role == WaypointRole::Target {
            events.push(PathEvent::TargetReached { index: next });
        }
        if state.segments.get(segment).map(|r| r.end == next + 1).unwrap_or(false) {
            events.push(PathEvent::SegmentCompleted { segment });
        }
        if state.is_completed {
            events.push(PathEvent::PathCompleted);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Waypoint> {
        (0..n).map(|i| Waypoint::new(10.0 + 5.0 * i as f64, 20.0)).collect()
    }

    #[test]
    fn test_empty_path_is_complete() {
        let state = PathState::new("empty", vec![]);
        assert!(state.is_completed());
        assert_eq!(state.progress_fraction(), 1.0);
        assert_eq!(state.next_index(), None);
    }

    #[test]
    fn test_single_point_path_is_complete() {
        let state = PathState::new("dot", vec![Waypoint::new(1.0, 1.0)]);
        assert!(state.is_completed());
        assert_eq!(state.progress_fraction(), 1.0);
    }

    #[test]
    fn test_walk_progress_strictly_increases() {
        let waypoints = line(6);
        let mut state = PathState::new("line", waypoints.clone());
        let tracker = PathProgressTracker::new(1.0);
        assert_eq!(state.progress_fraction(), 0.0);
        assert!(!state.is_completed());

        let mut last = state.progress_fraction();
        for (i, wp) in waypoints.iter().enumerate().skip(1) {
            let events = tracker.update(&mut state, wp.position);
            assert!(!events.is_empty(), "waypoint {} should be reached", i);
            assert!(state.progress_fraction() > last);
            last = state.progress_fraction();
            assert_eq!(state.is_completed(), i == waypoints.len() - 1);
        }
        assert_eq!(state.progress_fraction(), 1.0);
    }

    #[test]
    fn test_out_of_radius_does_not_advance() {
        let mut state = PathState::new("line", line(3));
        let tracker = PathProgressTracker::new(2.0);
        let events = tracker.update(&mut state, Vector2::new(15.0, 22.5));
        assert!(events.is_empty());
        assert_eq!(state.current_index(), 0);

        let events = tracker.update(&mut state, Vector2::new(15.0, 22.0));
        assert_eq!(state.current_index(), 1);
        assert_eq!(
            events,
            vec![PathEvent::WaypointReached {
                index: 1,
                role: WaypointRole::Normal
            }]
        );
    }

    #[test]
    fn test_advances_at_most_one_per_tick() {
        let waypoints = vec![Waypoint::new(0.0, 0.0), Waypoint::new(0.0, 0.0), Waypoint::new(0.0, 0.0)];
        let mut state = PathState::new("stacked", waypoints);
        let tracker = PathProgressTracker::new(1.0);
        tracker.update(&mut state, Vector2::ZERO);
        assert_eq!(state.current_index(), 1);
        tracker.update(&mut state, Vector2::ZERO);
        assert_eq!(state.current_index(), 2);
        assert!(state.is_completed());
        assert!(tracker.update(&mut state, Vector2::ZERO).is_empty());
    }

    #[test]
    fn test_broken_segments_and_events() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(10.0, 0.0).with_role(WaypointRole::Checkpoint),
            Waypoint::new(30.0, 0.0).broken(),
            Waypoint::new(40.0, 0.0).with_role(WaypointRole::Target),
        ];
        let mut state = PathState::new("letters", waypoints);
        let tracker = PathProgressTracker::new(0.5);
        assert_eq!(state.segments().len(), 2);
        assert_eq!(state.current_segment_index(), 0);

        let events = tracker.update(&mut state, Vector2::new(10.0, 0.0));
        assert!(events.contains(&PathEvent::SegmentCompleted { segment: 0 }));
        assert!(state.is_segment_completed(0));
        assert_eq!(state.current_segment_index(), 1);

        tracker.update(&mut state, Vector2::new(30.0, 0.0));
        assert!(!state.is_segment_completed(1));

        let events = tracker.update(&mut state, Vector2::new(40.0, 0.0));
        assert_eq!(
            events,
            vec![
                PathEvent::WaypointReached {
                    index: 3,
                    role: WaypointRole::Target
                },
                PathEvent::TargetReached { index: 3 },
                PathEvent::SegmentCompleted { segment: 1 },
                PathEvent::PathCompleted,
            ]
        );
        assert!(state.is_completed());
    }

    #[test]
    fn test_all_broken_path_requires_last_index() {
        let waypoints: Vec<_> = (0..4)
            .map(|i| Waypoint::new(i as f64 * 10.0, 0.0).broken())
            .collect();
        let mut state = PathState::new("dots", waypoints);
        let tracker = PathProgressTracker::new(1.0);

        for x in [10.0, 20.0] {
            tracker.update(&mut state, Vector2::new(x, 0.0));
            assert!(!state.is_completed());
        }
        tracker.update(&mut state, Vector2::new(30.0, 0.0));
        assert!(state.is_completed());
    }

    #[test]
    fn test_reset_progress() {
        let mut state = PathState::new("line", line(3));
        let tracker = PathProgressTracker::new(1.0);
        tracker.update(&mut state, Vector2::new(15.0, 20.0));
        state.reset_progress();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_segment_index(), 0);
        assert_eq!(state.progress_fraction(), 0.0);
    }

    #[test]
    fn test_navigation_info() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(0.0, 10.0),
            Waypoint::new(20.0, 10.0).broken(),
            Waypoint::new(20.0, 30.0),
        ];
        let state = PathState::new("nav", waypoints);
        let nav = state.navigation(Vector2::new(0.0, 4.0));

        assert_eq!(nav.next_index, Some(1));
        assert!((nav.distance_to_next - 6.0).abs() < 1e-12);
        assert!((nav.direction_degrees - 90.0).abs() < 1e-9);
        assert!((nav.total_length - 30.0).abs() < 1e-12);
        // 6 to the next point, gap skipped, 20 for the last link
        assert!((nav.remaining_length - 26.0).abs() < 1e-12);
        assert_eq!(nav.segment_count, 2);
    }
}
