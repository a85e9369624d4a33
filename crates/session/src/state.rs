//! Per-iteration session state
//!
//! All mutable loop-local state lives here as explicit fields so the
//! loop's transition function stays testable in isolation from the
//! hardware collaborators.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use image::RgbImage;

/// Frames-per-second accounting over wall-clock second boundaries.
///
/// FPS is the number of frames observed since the last whole-second
/// transition, inherently approximate at low frame counts.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames_in_window: u64,
    fps: u64,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames_in_window: 0,
            fps: 0,
        }
    }

    /// Record one frame and return the current FPS reading
    pub fn tick(&mut self, now: Instant) -> u64 {
        self.frames_in_window += 1;
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.fps = self.frames_in_window;
            self.frames_in_window = 0;
            self.window_start = now;
        }
        self.fps
    }

    pub fn fps(&self) -> u64 {
        self.fps
    }
}

/// Bounded training-capture counter in `[0, max]`.
///
/// Exceeding the bound is a no-op, not an error.
#[derive(Debug, Clone, Copy)]
pub struct TrainingCounter {
    count: u32,
    max: u32,
}

impl TrainingCounter {
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    /// Accept one capture if below the cap; returns whether it counted
    pub fn accept(&mut self) -> bool {
        if self.count < self.max {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn full(&self) -> bool {
        self.count >= self.max
    }
}

/// Recognition outcome cached for display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedPrediction {
    pub name: String,
    pub confidence: f64,
}

/// Mutable state threaded through each loop iteration
#[derive(Debug)]
pub struct SessionState {
    /// Frames acquired so far
    pub frames_seen: u64,
    pub fps: FpsCounter,
    pub training: TrainingCounter,
    /// Last validated face crop, resized for display and capture
    pub current_crop: Option<RgbImage>,
    /// When the current crop was delivered
    pub crop_captured_at: Option<DateTime<Local>>,
    /// Last recognition shown on the overlay
    pub last_prediction: Option<DisplayedPrediction>,
    /// Last known distance reading, retained between samples
    pub distance_cm: f64,
}

impl SessionState {
    pub fn new(max_training_samples: u32) -> Self {
        Self {
            frames_seen: 0,
            fps: FpsCounter::new(Instant::now()),
            training: TrainingCounter::new(max_training_samples),
            current_crop: None,
            crop_captured_at: None,
            last_prediction: None,
            distance_cm: 0.0,
        }
    }
}
