//! Error types for the fallible edges of the control core
//!
//! The per-tick pipeline never fails: malformed frames, degenerate centroids,
//! conflicting thresholds and empty paths are all recovered locally. Errors
//! only surface where the core touches files, channels or output sinks.

use thiserror::Error;

/// Errors that can occur outside the per-tick pipeline
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unknown path preset: {0}")]
    UnknownPath(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] crate::sensing::FrameError),

    #[error("Control runner channel closed")]
    ChannelClosed,
}

/// Result type for control core operations
pub type ControlResult<T> = Result<T, ControlError>;
