//! Sentry Session
//!
//! Orchestrates the continuous video-analysis loop: frame acquisition,
//! background face analysis, training capture, recognition display,
//! status overlay, periodic distance sampling, and stop-file shutdown.

pub mod config;
pub mod overlay;
pub mod runner;
pub mod state;

pub use config::SessionConfig;
pub use runner::Session;
pub use state::{FpsCounter, SessionState, TrainingCounter};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Camera(#[from] camera_capture::CameraError),

    #[error(transparent)]
    Registry(#[from] face_registry::RegistryError),

    #[error(transparent)]
    Range(#[from] range_sensor::RangeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize tracing subscriber for logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
