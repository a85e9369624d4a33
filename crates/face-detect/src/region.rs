//! Region detection types and capability

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned candidate region, in pixels of the searched image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the region
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }
}

/// Multi-scale search parameters for one detection pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectParams {
    /// Image pyramid scale step
    pub scale_factor: f32,
    /// Neighbor count required to keep a candidate
    pub min_neighbors: u32,
    /// Smallest candidate side, pixels
    pub min_size: u32,
    /// Largest candidate side, pixels
    pub max_size: u32,
}

impl DetectParams {
    /// Whole-frame face search window
    pub fn face() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 10,
            max_size: 400,
        }
    }

    /// Eye search within a face region
    pub fn eye() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 10,
            max_size: 50,
        }
    }

    /// Nose search within a face region
    pub fn nose() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 10,
            max_size: 200,
        }
    }
}

/// Region detection capability.
///
/// Given a grayscale image, return candidate rectangles. The detector's
/// internal algorithm (Haar cascade, neural model, ...) is an external
/// concern; implementations must be shareable with the background
/// analysis thread.
pub trait RegionDetector: Send + Sync {
    fn detect(&self, image: &GrayImage, params: &DetectParams) -> Vec<Region>;
}

/// Fractional placement of a mock detection within the searched image
#[derive(Debug, Clone, Copy)]
struct FractRegion {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Deterministic stand-in used when no cascade runtime is linked.
///
/// Emits plausibly placed regions scaled to the searched image, so the
/// full pipeline (validation, markers, scheduling, capture) can run on a
/// development host. Real detectors plug in behind [`RegionDetector`].
pub struct MockRegionDetector {
    layout: Vec<FractRegion>,
}

impl MockRegionDetector {
    /// One centered face region
    pub fn face() -> Self {
        Self {
            layout: vec![FractRegion {
                x: 0.3,
                y: 0.2,
                width: 0.4,
                height: 0.5,
            }],
        }
    }

    /// Two eye regions in the upper half of a face crop
    pub fn eyes() -> Self {
        Self {
            layout: vec![
                FractRegion {
                    x: 0.15,
                    y: 0.25,
                    width: 0.2,
                    height: 0.15,
                },
                FractRegion {
                    x: 0.6,
                    y: 0.25,
                    width: 0.2,
                    height: 0.15,
                },
            ],
        }
    }

    /// One nose region in the middle of a face crop
    pub fn nose() -> Self {
        Self {
            layout: vec![FractRegion {
                x: 0.4,
                y: 0.45,
                width: 0.2,
                height: 0.25,
            }],
        }
    }
}

impl RegionDetector for MockRegionDetector {
    fn detect(&self, image: &GrayImage, _params: &DetectParams) -> Vec<Region> {
        let (w, h) = image.dimensions();
        self.layout
            .iter()
            .map(|f| {
                Region::new(
                    (w as f32 * f.x) as u32,
                    (h as f32 * f.y) as u32,
                    (w as f32 * f.width).max(1.0) as u32,
                    (h as f32 * f.height).max(1.0) as u32,
                )
            })
            .collect()
    }
}
