//! Labeled face sample storage

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::{imageops::FilterType, GrayImage, RgbImage};
use tracing::{info, warn};

use crate::{LabelRegistry, RegistryError};

/// Side length of the fixed square all samples are resized to
pub const SAMPLE_SIZE: u32 = 100;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// The exact training input for the recognizer: index-aligned parallel
/// collections, never reordered after construction.
#[derive(Debug, Default)]
pub struct TrainingSet {
    pub samples: Vec<GrayImage>,
    pub labels: Vec<u32>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Directory of labeled face images, one file per sample, named
/// `identity_timestamp.jpg`.
pub struct SampleStore {
    dir: PathBuf,
}

impl SampleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every recognizable image in the directory as a grayscale
    /// sample, resolving identities through `registry`.
    ///
    /// Files are visited in filename order so labels are reproducible on
    /// one host; an unreadable directory is fatal, an undecodable file
    /// is skipped with a warning.
    pub fn load_all(&self, registry: &mut LabelRegistry) -> Result<TrainingSet, RegistryError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| RegistryError::Directory {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| has_image_extension(path))
            .collect();
        paths.sort();

        let mut set = TrainingSet::default();
        for path in paths {
            let Some(identity) = identity_from_filename(&path) else {
                continue;
            };
            let image = match image::open(&path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping unreadable sample {}: {e}", path.display());
                    continue;
                }
            };
            let sample = image
                .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
                .to_luma8();
            let label = registry.resolve(&identity);
            info!(
                "Loaded sample {} as label {label}",
                path.display()
            );
            set.samples.push(sample);
            set.labels.push(label);
        }
        Ok(set)
    }

    /// Persist a validated face crop under the training identity.
    ///
    /// Timestamp resolution is one second; collision with a previous
    /// capture is not formally prevented, process pacing makes it
    /// practically impossible.
    pub fn append(
        &self,
        identity: &str,
        image: &RgbImage,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, RegistryError> {
        let filename = format!("{identity}_{}.jpg", timestamp.format("%d%m%Y%H%M%S"));
        let path = self.dir.join(filename);
        image.save(&path)?;
        info!("Captured training sample {}", path.display());
        Ok(path)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Identity is the file stem up to the first underscore
fn identity_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let identity = stem.split('_').next().unwrap_or(stem);
    if identity.is_empty() {
        None
    } else {
        Some(identity.to_string())
    }
}
