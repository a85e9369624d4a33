//! Identity Registry and Training Store
//!
//! Maps identity strings to stable integer labels, persists labeled face
//! samples as image files, and feeds them to a trainable recognizer.
//!
//! Labels are only stable within one process run: the registry is
//! rebuilt from the sample directory at startup and must never be
//! persisted or compared across runs.

pub mod recognizer;
pub mod registry;
pub mod store;

pub use recognizer::{FaceRecognizer, Prediction, TemplateRecognizer};
pub use registry::LabelRegistry;
pub use store::{SampleStore, TrainingSet, SAMPLE_SIZE};

use std::path::PathBuf;
use thiserror::Error;

/// Registry and training error types
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Cannot read training directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Sample write failed: {0}")]
    SampleWrite(#[from] image::ImageError),

    #[error("Training set is inconsistent: {samples} samples, {labels} labels")]
    Mismatched { samples: usize, labels: usize },

    #[error("Recognizer needs at least 2 distinct identities, found {found}")]
    InsufficientIdentities { found: usize },
}
