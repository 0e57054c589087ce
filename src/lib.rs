//! Tactile control core
//!
//! Turns a stream of pressure-sensor frames into actor motion. Each frame is
//! checked for contact, reduced to a center of pressure and compared with
//! the anchor of the current contact episode. The anchor distance selects
//! joystick or touchpad control, the resulting target is smoothed into an
//! actor position and that position is tracked along an optional waypoint
//! path.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod sensing;

pub use config::ControlConfig;
pub use engine::{ControlLoop, ControlRunner, ControlSnapshot};
pub use error::{ControlError, ControlResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "tactile_control=info";

/// Initialize tracing/logging to stderr
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
