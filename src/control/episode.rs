//! Contact episode lifecycle
//!
//! An episode spans one continuous contact. It owns the anchor COP (the
//! distance reference for mode arbitration) and the touchpad accumulator.
//! Ending an episode discards both, so nothing carries over between
//! unrelated touches.

use crate::geometry::Vector2;
use crate::sensing::ContactState;
use uuid::Uuid;

/// Transition reported by [`ControlEpisode::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeTransition {
    /// No state change this tick
    Unchanged,
    /// A new episode began; the anchor was just set
    Started,
    /// The running episode ended; anchor and accumulator were cleared
    Ended,
}

/// Per-contact control memory
#[derive(Debug, Clone, Default)]
pub struct ControlEpisode {
    anchor: Option<Vector2>,
    /// Exponentially smoothed touchpad offset
    pub accumulated_displacement: Vector2,
    id: Option<Uuid>,
    started_tick: Option<u64>,
}

impl ControlEpisode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the lifecycle with this tick's contact and COP.
    ///
    /// A contacted tick without a COP defers the start until a COP appears.
    /// While active the anchor is never overwritten.
    pub fn observe(&mut self, contact: &ContactState, cop: Option<Vector2>, tick: u64) -> EpisodeTransition {
        if !contact.in_contact {
            if self.is_active() {
                self.end();
                return EpisodeTransition::Ended;
            }
            return EpisodeTransition::Unchanged;
        }

        match (self.anchor, cop) {
            (None, Some(cop)) => {
                self.anchor = Some(cop);
                self.accumulated_displacement = Vector2::ZERO;
                self.id = Some(Uuid::new_v4());
                self.started_tick = Some(tick);
                EpisodeTransition::Started
            }
            _ => EpisodeTransition::Unchanged,
        }
    }

    /// Discard all per-episode memory
    pub fn end(&mut self) {
        self.anchor = None;
        self.accumulated_displacement = Vector2::ZERO;
        self.id = None;
        self.started_tick = None;
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Vector2> {
        self.anchor
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Number of ticks since the episode started, if active
    pub fn age(&self, tick: u64) -> Option<u64> {
        self.started_tick.map(|start| tick.saturating_sub(start))
    }
}
