//! Frame emission capability

use std::path::PathBuf;

use crate::{CameraError, Frame};

/// Destination for composited frames, written once per loop iteration.
pub trait FrameSink {
    fn emit(&mut self, frame: &Frame) -> Result<(), CameraError>;
}

/// Sink that overwrites a single JPEG file each iteration.
///
/// The file is typically served by an external web frontend in place of a
/// live video window.
pub struct JpegFileSink {
    path: PathBuf,
}

impl JpegFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for JpegFileSink {
    fn emit(&mut self, frame: &Frame) -> Result<(), CameraError> {
        frame.image.save(&self.path)?;
        Ok(())
    }
}
