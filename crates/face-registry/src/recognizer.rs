//! Trainable face recognition

use std::collections::HashMap;

use image::{imageops::FilterType, DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{RegistryError, TrainingSet, SAMPLE_SIZE};

/// Recognition outcome. `confidence` is a distance in the recognizer's
/// feature space; lower means a closer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: u32,
    pub confidence: f64,
}

/// Trainable classifier capability.
///
/// The production recognizer model is an external collaborator; this
/// contract fixes what the session loop relies on: batch training over
/// an index-aligned sample/label set, and per-crop prediction.
pub trait FaceRecognizer {
    /// Train from scratch on the full sample set.
    ///
    /// Fails when the set is inconsistent or covers fewer than two
    /// distinct identities.
    fn train(&mut self, set: &TrainingSet) -> Result<(), RegistryError>;

    /// Predict the closest known identity, or `None` if untrained
    fn predict(&self, face: &GrayImage) -> Option<Prediction>;
}

/// Mean-template recognizer.
///
/// Averages all samples of each label into one template vector and
/// matches by Euclidean distance. A stand-in for heavier subspace
/// models, adequate for the small per-identity sample counts the
/// training cap produces.
#[derive(Debug, Default)]
pub struct TemplateRecognizer {
    templates: Vec<(u32, Vec<f64>)>,
}

impl TemplateRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FaceRecognizer for TemplateRecognizer {
    fn train(&mut self, set: &TrainingSet) -> Result<(), RegistryError> {
        if set.samples.len() != set.labels.len() {
            return Err(RegistryError::Mismatched {
                samples: set.samples.len(),
                labels: set.labels.len(),
            });
        }

        let mut sums: HashMap<u32, (Vec<f64>, usize)> = HashMap::new();
        for (sample, &label) in set.samples.iter().zip(&set.labels) {
            let pixels = normalized_pixels(sample);
            let entry = sums
                .entry(label)
                .or_insert_with(|| (vec![0.0; pixels.len()], 0));
            for (acc, value) in entry.0.iter_mut().zip(&pixels) {
                *acc += value;
            }
            entry.1 += 1;
        }

        if sums.len() < 2 {
            return Err(RegistryError::InsufficientIdentities { found: sums.len() });
        }

        let mut templates: Vec<(u32, Vec<f64>)> = sums
            .into_iter()
            .map(|(label, (mut sum, count))| {
                for value in &mut sum {
                    *value /= count as f64;
                }
                (label, sum)
            })
            .collect();
        templates.sort_by_key(|(label, _)| *label);

        info!(
            identities = templates.len(),
            samples = set.len(),
            "Trained face recognizer"
        );
        self.templates = templates;
        Ok(())
    }

    fn predict(&self, face: &GrayImage) -> Option<Prediction> {
        if self.templates.is_empty() {
            return None;
        }
        let pixels = normalized_pixels(face);
        self.templates
            .iter()
            .map(|(label, template)| Prediction {
                label: *label,
                confidence: euclidean(template, &pixels),
            })
            .min_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

/// Flatten to a fixed-length vector, resizing if the input is not
/// already sample sized
fn normalized_pixels(image: &GrayImage) -> Vec<f64> {
    if image.dimensions() == (SAMPLE_SIZE, SAMPLE_SIZE) {
        return image.pixels().map(|p| p.0[0] as f64).collect();
    }
    DynamicImage::ImageLuma8(image.clone())
        .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
        .to_luma8()
        .pixels()
        .map(|p| p.0[0] as f64)
        .collect()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn flat(shade: u8) -> GrayImage {
        GrayImage::from_pixel(SAMPLE_SIZE, SAMPLE_SIZE, Luma([shade]))
    }

    fn two_identity_set() -> TrainingSet {
        TrainingSet {
            samples: vec![flat(30), flat(34), flat(220)],
            labels: vec![1, 1, 2],
        }
    }

    #[test]
    fn test_predicts_nearest_identity() {
        let mut recognizer = TemplateRecognizer::new();
        recognizer.train(&two_identity_set()).unwrap();

        let near_first = recognizer.predict(&flat(33)).unwrap();
        assert_eq!(near_first.label, 1);

        let near_second = recognizer.predict(&flat(210)).unwrap();
        assert_eq!(near_second.label, 2);
    }

    #[test]
    fn test_confidence_is_distance() {
        let mut recognizer = TemplateRecognizer::new();
        recognizer.train(&two_identity_set()).unwrap();

        // Template for label 1 is the mean shade 32
        let exact = recognizer.predict(&flat(32)).unwrap();
        let off = recognizer.predict(&flat(40)).unwrap();
        assert!(exact.confidence < off.confidence);
        assert!(exact.confidence.abs() < 1e-9);
    }

    #[test]
    fn test_untrained_predicts_none() {
        let recognizer = TemplateRecognizer::new();
        assert!(recognizer.predict(&flat(10)).is_none());
    }

    #[test]
    fn test_single_identity_is_rejected() {
        let mut recognizer = TemplateRecognizer::new();
        let set = TrainingSet {
            samples: vec![flat(30), flat(31)],
            labels: vec![1, 1],
        };
        assert!(matches!(
            recognizer.train(&set),
            Err(RegistryError::InsufficientIdentities { found: 1 })
        ));
    }

    #[test]
    fn test_mismatched_set_is_rejected() {
        let mut recognizer = TemplateRecognizer::new();
        let set = TrainingSet {
            samples: vec![flat(30)],
            labels: vec![1, 2],
        };
        assert!(matches!(
            recognizer.train(&set),
            Err(RegistryError::Mismatched { .. })
        ));
    }
}
