//! Per-tick state record handed to external consumers

use crate::control::ControlMode;
use crate::geometry::Vector2;
use crate::navigation::{NavigationInfo, PathEvent, PathState};
use crate::sensing::ContactState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Immutable snapshot of the control core after one tick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    /// Tick counter, incremented for every tick including no-op ones
    pub tick: u64,
    /// False when no new frame was available and the state was frozen
    pub fresh: bool,
    pub contact: ContactState,
    pub cop: Option<Vector2>,
    pub anchor: Option<Vector2>,
    pub episode_id: Option<Uuid>,
    pub mode: ControlMode,
    /// Anchor-to-COP distance the mode was derived from
    pub distance: f64,
    /// Resolved target the actor moved toward
    pub target: Vector2,
    pub actor_position: Vector2,
    pub path: Option<PathState>,
    pub navigation: Option<NavigationInfo>,
    /// Path events observed this tick
    pub events: Vec<PathEvent>,
    pub captured_at: DateTime<Utc>,
}

impl ControlSnapshot {
    /// Snapshot of a core that has not processed any frame yet
    pub fn initial(actor_position: Vector2) -> Self {
        Self {
            tick: 0,
            fresh: false,
            contact: ContactState::none(),
            cop: None,
            anchor: None,
            episode_id: None,
            mode: ControlMode::Idle,
            distance: 0.0,
            target: actor_position,
            actor_position,
            path: None,
            navigation: None,
            events: Vec::new(),
            captured_at: Utc::now(),
        }
    }

    pub fn path_completed(&self) -> bool {
        self.events.contains(&PathEvent::PathCompleted)
    }
}
