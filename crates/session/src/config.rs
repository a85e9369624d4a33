//! Session configuration

use std::path::PathBuf;

use camera_capture::CameraConfig;
use range_sensor::RangeConfig;
use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run face analysis on captured frames
    pub analysis_enabled: bool,

    /// When set, training-capture mode is active for this identity
    pub training_identity: Option<String>,

    /// Maximum training samples captured per session
    pub max_training_samples: u32,

    /// Directory of labeled training images (`identity_timestamp.jpg`)
    pub training_dir: PathBuf,

    /// Cascade asset directory supplied by the detection collaborator.
    /// Must exist when set; `None` falls back to mock detectors.
    pub cascade_dir: Option<PathBuf>,

    /// Composited output image, overwritten once per iteration
    pub output_image: PathBuf,

    /// Sentinel file whose existence requests a graceful shutdown
    pub stop_file: PathBuf,

    /// TrueType font for overlay text; text is skipped if unavailable
    pub font_path: Option<PathBuf>,

    /// Sample the distance sensor every this many frames
    pub distance_interval: u64,

    /// Drive the ultrasonic sensor (needs GPIO access)
    pub ranging_enabled: bool,

    /// BCM pin driving the sensor trigger line
    pub trigger_pin: u32,

    /// BCM pin reading the sensor echo line
    pub echo_pin: u32,

    pub camera: CameraConfig,
    pub range: RangeConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            analysis_enabled: false,
            training_identity: None,
            max_training_samples: 10,
            training_dir: PathBuf::from("data/faceimages"),
            cascade_dir: None,
            output_image: PathBuf::from("image.jpg"),
            stop_file: PathBuf::from("stop-video-capture.txt"),
            font_path: Some(PathBuf::from(
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            )),
            distance_interval: 150,
            ranging_enabled: true,
            trigger_pin: 23,
            echo_pin: 24,
            camera: CameraConfig::default(),
            range: RangeConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Whether training-capture mode is active
    pub fn training_mode(&self) -> bool {
        self.training_identity.is_some()
    }
}
