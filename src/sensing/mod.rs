//! Sensor-side processing
//!
//! Turns raw pressure frames into a contact summary and a center of
//! pressure, and defines where frames come from.

pub mod centroid;
pub mod contact;
pub mod frame;
pub mod source;

pub use centroid::estimate_cop;
pub use contact::{detect_contact, ContactState};
pub use frame::{FrameError, PressureFrame};
pub use source::{
    spawn_frame_producer, LatestFrameSlot, PressureFrameSource, ReplayFrameSource,
    SyntheticFrameSource,
};
