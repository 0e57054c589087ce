//! Async control runner
//!
//! Drives a [`ControlLoop`] on a fixed tick interval. Commands from other
//! tasks (parameter updates, path loads) are queued on a channel and applied
//! between ticks, never during one. The latest snapshot is broadcast on a
//! watch channel and every snapshot is handed to a [`SnapshotSink`].

use crate::config::ParameterUpdate;
use crate::engine::control_loop::ControlLoop;
use crate::engine::sink::SnapshotSink;
use crate::engine::snapshot::ControlSnapshot;
use crate::error::{ControlError, ControlResult};
use crate::navigation::Waypoint;
use crate::sensing::PressureFrameSource;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Requests applied by the runner between ticks
#[derive(Debug, Clone)]
pub enum ControlCommand {
    UpdateParameters(ParameterUpdate),
    LoadPath { name: String, waypoints: Vec<Waypoint> },
    DisablePath,
    ResetPath,
    Reset,
    Shutdown,
}

/// Cloneable handle for talking to a running [`ControlRunner`]
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    commands: mpsc::UnboundedSender<ControlCommand>,
    snapshots: watch::Receiver<Option<ControlSnapshot>>,
}

impl RunnerHandle {
    pub fn send(&self, command: ControlCommand) -> ControlResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ControlError::ChannelClosed)
    }

    pub fn update_parameters(&self, update: ParameterUpdate) -> ControlResult<()> {
        self.send(ControlCommand::UpdateParameters(update))
    }

    pub fn load_path(&self, name: impl Into<String>, waypoints: Vec<Waypoint>) -> ControlResult<()> {
        self.send(ControlCommand::LoadPath {
            name: name.into(),
            waypoints,
        })
    }

    pub fn shutdown(&self) -> ControlResult<()> {
        self.send(ControlCommand::Shutdown)
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Option<ControlSnapshot>> {
        self.snapshots.clone()
    }

    /// Most recent snapshot, if any tick ran yet
    pub fn latest(&self) -> Option<ControlSnapshot> {
        self.snapshots.borrow().clone()
    }
}

/// Owns the control loop and its frame source while running
pub struct ControlRunner<S> {
    control: ControlLoop,
    source: S,
    commands: mpsc::UnboundedReceiver<ControlCommand>,
    snapshots: watch::Sender<Option<ControlSnapshot>>,
    tick_interval: Duration,
}

impl<S: PressureFrameSource> ControlRunner<S> {
    pub fn new(control: ControlLoop, source: S) -> (Self, RunnerHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let tick_interval = Duration::from_millis(control.config().runner.tick_interval_ms.max(1));

        let runner = Self {
            control,
            source,
            commands: command_rx,
            snapshots: snapshot_tx,
            tick_interval,
        };
        let handle = RunnerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (runner, handle)
    }

    /// Override the tick period from the config
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Tick until `max_ticks` is reached (if given) or a shutdown command
    /// arrives, then hand the loop back.
    pub async fn run<K: SnapshotSink + ?Sized>(
        mut self,
        sink: &mut K,
        max_ticks: Option<u64>,
    ) -> ControlResult<ControlLoop> {
        tracing::info!(
            "Control runner started (interval={:?}, max_ticks={:?})",
            self.tick_interval,
            max_ticks
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        loop {
            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            interval.tick().await;

            if !self.apply_pending_commands() {
                tracing::info!("Control runner shutdown requested");
                break;
            }

            let snapshot = self.control.poll(&mut self.source);
            sink.publish(&snapshot).await?;
            self.snapshots.send_replace(Some(snapshot));
            ticks += 1;
        }

        sink.flush().await?;
        tracing::info!(
            "Control runner stopped (ticks={}, paths_completed={})",
            ticks,
            self.control.stats().paths_completed
        );
        Ok(self.control)
    }

    /// Drain queued commands; returns false when a shutdown was requested
    fn apply_pending_commands(&mut self) -> bool {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                ControlCommand::UpdateParameters(update) => {
                    let report = self.control.update_parameters(&update);
                    if !report.is_clean() {
                        tracing::warn!(
                            "Parameter update partially applied (rejected={:?}, adjustment={:?})",
                            report.rejected,
                            report.threshold_adjustment
                        );
                    }
                }
                ControlCommand::LoadPath { name, waypoints } => {
                    self.control.load_named_path(&name, waypoints);
                }
                ControlCommand::DisablePath => self.control.disable_path(),
                ControlCommand::ResetPath => self.control.reset_path_progress(),
                ControlCommand::Reset => self.control.reset(),
                ControlCommand::Shutdown => return false,
            }
        }
        true
    }
}
