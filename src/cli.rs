//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tactile_control::geometry::Vector2;

/// Tactile control - pressure-sensor contact control and path tracking
#[derive(Parser, Debug)]
#[command(name = "tactile-control")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the async runner over a synthetic press-and-drag gesture
    Simulate {
        /// Preset path to navigate
        #[arg(short, long, default_value = "straight-line")]
        path: String,

        /// Number of control ticks to run
        #[arg(short, long, default_value = "200")]
        ticks: u64,

        /// Finger stroke in grid cells, as "dx,dy"
        #[arg(short, long, default_value = "6,0", value_parser = parse_stroke, allow_hyphen_values = true)]
        stroke: Vector2,

        /// Frames the finger rests before and after the stroke
        #[arg(long, default_value = "5")]
        hold: usize,
    },

    /// Run the control loop over recorded frames
    Replay {
        /// JSON array of frames (null = no new frame that tick)
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of waypoints to navigate
        #[arg(short, long, conflicts_with = "path")]
        waypoints: Option<PathBuf>,

        /// Preset path to navigate
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List preset paths
    Paths,

    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_stroke(s: &str) -> Result<Vector2, String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"dx,dy\", got \"{}\"", s))?;
    let dx: f64 = dx.trim().parse().map_err(|e| format!("invalid dx: {}", e))?;
    let dy: f64 = dy.trim().parse().map_err(|e| format!("invalid dy: {}", e))?;
    let stroke = Vector2::new(dx, dy);
    if !stroke.is_finite() {
        return Err("stroke must be finite".to_string());
    }
    Ok(stroke)
}
