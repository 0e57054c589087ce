//! Synchronous control loop
//!
//! One tick consumes at most one frame and runs the full pipeline:
//! contact detection, centroid, episode lifecycle, mode arbitration,
//! displacement, position integration and path tracking. The loop owns all
//! mutable state; consumers only ever see [`ControlSnapshot`] copies.

use crate::config::{ControlConfig, ParameterReport, ParameterUpdate};
use crate::control::{
    arbitrate_mode, ControlEpisode, ControlMode, DisplacementController, EpisodeTransition,
    PositionIntegrator,
};
use crate::engine::snapshot::ControlSnapshot;
use crate::geometry::Vector2;
use crate::navigation::{CompletionStats, PathEvent, PathProgressTracker, PathState, Waypoint};
use crate::sensing::centroid::weighted_centroid;
use crate::sensing::contact::measure_contact;
use crate::sensing::{ContactState, FrameError, PressureFrame, PressureFrameSource};
use chrono::Utc;

/// Name given to paths loaded without one
pub const UNNAMED_PATH: &str = "custom";

#[derive(Debug, Clone)]
struct ActivePath {
    state: PathState,
    loaded_tick: u64,
}

/// Owns the per-session control state and advances it tick by tick
#[derive(Debug)]
pub struct ControlLoop {
    config: ControlConfig,
    frame_shape: Option<(usize, usize)>,
    episode: ControlEpisode,
    controller: DisplacementController,
    integrator: PositionIntegrator,
    mode: ControlMode,
    path: Option<ActivePath>,
    stats: CompletionStats,
    tick: u64,
    last: ControlSnapshot,
}

impl ControlLoop {
    pub fn new(config: ControlConfig) -> Self {
        let integrator = PositionIntegrator::new(config.world.actor_start, &config.world.bounds);
        let last = ControlSnapshot::initial(integrator.position());
        Self {
            config,
            frame_shape: None,
            episode: ControlEpisode::new(),
            controller: DisplacementController::new(),
            integrator,
            mode: ControlMode::Idle,
            path: None,
            stats: CompletionStats::default(),
            tick: 0,
            last,
        }
    }

    /// Pull one frame from `source` and tick; a missing frame freezes the state
    pub fn poll<S: PressureFrameSource + ?Sized>(&mut self, source: &mut S) -> ControlSnapshot {
        match source.next_frame() {
            Some(frame) => self.tick(&frame),
            None => self.tick_without_frame(),
        }
    }

    /// No new frame: keep episode, mode, position and path as they are
    pub fn tick_without_frame(&mut self) -> ControlSnapshot {
        self.tick += 1;
        let mut snapshot = self.last.clone();
        snapshot.tick = self.tick;
        snapshot.fresh = false;
        snapshot.events.clear();
        snapshot.captured_at = Utc::now();
        self.last = snapshot.clone();
        snapshot
    }

    /// Run the full pipeline on one frame
    pub fn tick(&mut self, frame: &PressureFrame) -> ControlSnapshot {
        self.tick += 1;

        let (contact, cop) = match self.check_frame(frame) {
            Ok(()) => (
                measure_contact(frame, &self.config.detection),
                weighted_centroid(frame, self.config.detection.pressure_threshold),
            ),
            Err(e) => {
                tracing::warn!("Invalid frame at tick {}, treating as no contact: {}", self.tick, e);
                (ContactState::none(), None)
            }
        };

        match self.episode.observe(&contact, cop, self.tick) {
            EpisodeTransition::Started => {
                tracing::info!(
                    "Contact episode started (anchor={:?}, area={}, peak={:.3})",
                    self.episode.anchor(),
                    contact.area,
                    contact.peak_pressure
                );
            }
            EpisodeTransition::Ended => {
                self.controller.reset();
                tracing::info!("Contact episode ended at tick {}", self.tick);
            }
            EpisodeTransition::Unchanged => {}
        }

        let anchor = self.episode.anchor();
        let current = if self.episode.is_active() { cop } else { None };
        let decision = arbitrate_mode(anchor, current, &self.config.thresholds);
        if decision.mode != self.mode {
            tracing::debug!(
                "Control mode switch: {} -> {} (distance={:.3}, joystick={}, touchpad={})",
                self.mode,
                decision.mode,
                decision.distance,
                self.config.thresholds.joystick(),
                self.config.thresholds.touchpad()
            );
            self.mode = decision.mode;
        }

        let position = self.integrator.position();
        let target = self
            .controller
            .compute(
                decision.mode,
                anchor,
                current,
                position,
                &mut self.episode,
                &self.config.displacement,
            )
            .resolve(position);
        let target = self.config.world.bounds.clamp(target);
        let actor_position = self
            .integrator
            .step(target, self.config.integrator.rate, &self.config.world.bounds);

        let events = self.advance_path(actor_position);

        let snapshot = ControlSnapshot {
            tick: self.tick,
            fresh: true,
            contact,
            cop,
            anchor,
            episode_id: self.episode.id(),
            mode: decision.mode,
            distance: decision.distance,
            target,
            actor_position,
            path: self.path.as_ref().map(|p| p.state.clone()),
            navigation: self.path.as_ref().map(|p| p.state.navigation(actor_position)),
            events,
            captured_at: Utc::now(),
        };
        self.last = snapshot.clone();
        snapshot
    }

    fn check_frame(&mut self, frame: &PressureFrame) -> Result<(), FrameError> {
        frame.validate()?;
        match self.frame_shape {
            None => {
                tracing::debug!("Session frame shape fixed at {}x{}", frame.width, frame.height);
                self.frame_shape = Some(frame.shape());
                Ok(())
            }
            Some((w, h)) if (w, h) == frame.shape() => Ok(()),
            Some((w, h)) => Err(FrameError::ShapeMismatch {
                expected_width: w,
                expected_height: h,
                actual_width: frame.width,
                actual_height: frame.height,
            }),
        }
    }

    fn advance_path(&mut self, actor_position: Vector2) -> Vec<PathEvent> {
        let Some(active) = self.path.as_mut() else {
            return Vec::new();
        };

        let tracker = PathProgressTracker::new(self.config.navigation.proximity_radius);
        let events = tracker.update(&mut active.state, actor_position);

        if events.contains(&PathEvent::PathCompleted) {
            let ticks = self.tick.saturating_sub(active.loaded_tick);
            self.stats.record(active.state.name(), ticks, Utc::now());
            tracing::info!("Path completed: {} ({} ticks)", active.state.name(), ticks);
        }
        events
    }

    /// Apply a partial parameter update between ticks
    pub fn update_parameters(&mut self, update: &ParameterUpdate) -> ParameterReport {
        update.apply_to(&mut self.config)
    }

    /// Replace the current path and start from its first waypoint
    pub fn load_path(&mut self, waypoints: Vec<Waypoint>) {
        self.load_named_path(UNNAMED_PATH, waypoints);
    }

    pub fn load_named_path(&mut self, name: &str, waypoints: Vec<Waypoint>) {
        let state = PathState::new(name, waypoints);
        if state.waypoints().is_empty() {
            tracing::info!("Loaded empty path '{}', nothing to navigate", name);
        } else {
            tracing::info!(
                "Loaded path '{}' ({} waypoints, {} segments)",
                name,
                state.waypoints().len(),
                state.segments().len()
            );
        }
        self.path = Some(ActivePath {
            state,
            loaded_tick: self.tick,
        });
    }

    /// Stop navigating; the actor stays under contact control
    pub fn disable_path(&mut self) {
        if self.path.take().is_some() {
            tracing::info!("Path navigation disabled");
        }
    }

    /// Restart the current path from its first waypoint
    pub fn reset_path_progress(&mut self) {
        if let Some(active) = self.path.as_mut() {
            active.state.reset_progress();
            active.loaded_tick = self.tick;
            tracing::info!("Path progress reset: {}", active.state.name());
        }
    }

    /// Return actor, episode and path progress to their initial state
    pub fn reset(&mut self) {
        self.episode.end();
        self.controller.reset();
        self.mode = ControlMode::Idle;
        self.frame_shape = None;
        self.integrator
            .reset(self.config.world.actor_start, &self.config.world.bounds);
        self.reset_path_progress();
        self.last = ControlSnapshot::initial(self.integrator.position());
        self.last.tick = self.tick;
        tracing::info!("Control state reset");
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn episode(&self) -> &ControlEpisode {
        &self.episode
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn actor_position(&self) -> Vector2 {
        self.integrator.position()
    }

    pub fn path(&self) -> Option<&PathState> {
        self.path.as_ref().map(|p| &p.state)
    }

    pub fn stats(&self) -> &CompletionStats {
        &self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn last_snapshot(&self) -> &ControlSnapshot {
        &self.last
    }
}
