//! Camera Capture Library for the Face Sentry Loop
//!
//! Provides the frame type and the acquisition/emission capability seams:
//! - Fixed-resolution color frame acquisition (camera driver is external)
//! - Mount orientation correction
//! - Per-iteration frame emission to a JPEG file sink

pub mod frame;
pub mod sink;
pub mod source;

pub use frame::Frame;
pub use sink::{FrameSink, JpegFileSink};
pub use source::{FrameSource, SyntheticSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Frame emit failed: {0}")]
    Emit(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Physical mount orientation of the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Camera mounted upright
    Upright,
    /// Camera mounted upside down (flip around both axes)
    #[default]
    Rotated180,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Physical mount orientation
    pub orientation: Orientation,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            orientation: Orientation::Rotated180,
        }
    }
}
