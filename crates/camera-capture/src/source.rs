//! Frame acquisition capability

use chrono::Local;
use image::{Rgb, RgbImage};
use tracing::warn;

use crate::{CameraConfig, CameraError, Frame};

/// Source of fixed-resolution color frames.
///
/// The camera driver itself is an external collaborator; acquisition is
/// the only operation that may legitimately block the session loop.
pub trait FrameSource {
    /// Block until the next frame is available
    fn acquire(&mut self) -> Result<Frame, CameraError>;
}

/// Synthetic frame source used when no camera driver is linked.
///
/// Produces a moving gradient test pattern at the configured geometry so
/// the rest of the pipeline can be exercised on a development host.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u64,
}

impl SyntheticSource {
    pub fn new(config: &CameraConfig) -> Self {
        warn!("No camera driver linked. Producing synthetic frames.");
        Self {
            width: config.width,
            height: config.height,
            sequence: 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn acquire(&mut self) -> Result<Frame, CameraError> {
        let phase = (self.sequence % 255) as u8;
        let image = RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([
                (x % 256) as u8,
                (y % 256) as u8,
                phase,
            ])
        });
        let frame = Frame::new(image, Local::now(), self.sequence);
        self.sequence += 1;
        Ok(frame)
    }
}
