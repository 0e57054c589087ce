//! Tactile control CLI
//!
//! Runs the control core against synthetic or recorded pressure frames and
//! prints one JSON snapshot per tick on stdout. Logs go to stderr.

mod cli;

use cli::{Cli, Commands};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tactile_control::config::ControlConfig;
use tactile_control::engine::{ControlLoop, ControlRunner, JsonLinesSink};
use tactile_control::geometry::Vector2;
use tactile_control::navigation::{load_waypoints, PathLibrary};
use tactile_control::sensing::{
    spawn_frame_producer, LatestFrameSlot, ReplayFrameSource, SyntheticFrameSource,
};
use tracing::info;

/// Sensor grid used by the simulator
const SIM_GRID: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose {
        "tactile_control=debug"
    } else {
        tactile_control::DEFAULT_LOG_FILTER
    };
    tactile_control::init_tracing(default_filter);

    let config = ControlConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            path,
            ticks,
            stroke,
            hold,
        } => run_simulate(config, &path, ticks, stroke, hold).await?,
        Commands::Replay {
            input,
            waypoints,
            path,
        } => run_replay(config, &input, waypoints.as_deref(), path.as_deref())?,
        Commands::Paths => run_paths(),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn run_simulate(
    config: ControlConfig,
    path_name: &str,
    ticks: u64,
    stroke: Vector2,
    hold: usize,
) -> anyhow::Result<()> {
    let library = PathLibrary::with_presets();
    let waypoints = library.get(path_name)?;
    let interval = Duration::from_millis(config.runner.tick_interval_ms);

    let center = Vector2::new(SIM_GRID as f64 / 2.0, SIM_GRID as f64 / 2.0);
    let drag_frames = (ticks as usize).saturating_sub(hold * 3).max(1);
    let script = SyntheticFrameSource::press_and_drag(center, stroke, hold, drag_frames, hold);
    let source = SyntheticFrameSource::new(SIM_GRID, SIM_GRID, script);

    info!(
        "Simulating '{}' for {} ticks (stroke={:?}, interval={:?})",
        path_name, ticks, stroke, interval
    );

    let slot = LatestFrameSlot::new();
    let is_running = Arc::new(AtomicBool::new(true));
    let producer = spawn_frame_producer(source, slot.clone(), is_running.clone(), interval);

    let mut control = ControlLoop::new(config);
    control.load_named_path(path_name, waypoints);

    let (runner, _handle) = ControlRunner::new(control, slot.clone());
    let mut sink = JsonLinesSink::new(tokio::io::stdout());
    let result = runner.run(&mut sink, Some(ticks)).await;

    is_running.store(false, Ordering::Relaxed);
    producer
        .join()
        .map_err(|_| anyhow::anyhow!("frame producer thread panicked"))?;

    let control = result?;
    report_summary(&control);
    if slot.dropped_frames() > 0 {
        info!("Frames overwritten before use: {}", slot.dropped_frames());
    }
    Ok(())
}

fn run_replay(
    config: ControlConfig,
    input: &Path,
    waypoints: Option<&Path>,
    path_name: Option<&str>,
) -> anyhow::Result<()> {
    let mut source = ReplayFrameSource::from_file(input)?;
    let mut control = ControlLoop::new(config);

    if let Some(file) = waypoints {
        control.load_path(load_waypoints(file)?);
    } else if let Some(name) = path_name {
        control.load_named_path(name, PathLibrary::with_presets().get(name)?);
    }

    info!("Replaying {} ticks from {}", source.remaining(), input.display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while !source.is_exhausted() {
        let snapshot = control.poll(&mut source);
        serde_json::to_writer(&mut out, &snapshot)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    report_summary(&control);
    Ok(())
}

fn run_paths() {
    let library = PathLibrary::with_presets();
    for name in library.names() {
        if let Ok(waypoints) = library.get(name) {
            println!("{:<16} {:>3} waypoints", name, waypoints.len());
        }
    }
}

fn report_summary(control: &ControlLoop) {
    let position = control.actor_position();
    info!(
        "Finished after {} ticks: actor=({:.2}, {:.2}), mode={}",
        control.tick_count(),
        position.x,
        position.y,
        control.mode()
    );
    if let Some(path) = control.path() {
        info!(
            "Path '{}': {:.0}% complete{}",
            path.name(),
            path.progress_fraction() * 100.0,
            if path.is_completed() { " (done)" } else { "" }
        );
    }
    for (name, record) in &control.stats().per_path {
        info!(
            "Completed '{}' {} time(s), best {} ticks",
            name, record.completions, record.best_ticks
        );
    }
}
