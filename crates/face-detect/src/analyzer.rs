//! Per-frame face analysis

use std::sync::Arc;

use camera_capture::Frame;
use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::drawing::{draw_hollow_ellipse_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::region::{DetectParams, Region, RegionDetector};

const EYE_MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const NOSE_MARKER_COLOR: Rgb<u8> = Rgb([255, 150, 0]);

/// A validated face crop extracted from one frame.
///
/// Ownership transfers analyzer → scheduler → session loop as a value;
/// the crop is never shared mutably.
#[derive(Debug, Clone)]
pub struct FaceCrop {
    /// Color sub-image of the face region
    pub image: RgbImage,
    /// Where in the source frame the face was found
    pub region: Region,
}

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub face: DetectParams,
    pub eye: DetectParams,
    pub nose: DetectParams,
    /// Draw eye/nose markers onto returned crops. Disabled in training
    /// capture mode so stored samples stay clean.
    pub draw_markers: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            face: DetectParams::face(),
            eye: DetectParams::eye(),
            nose: DetectParams::nose(),
            draw_markers: true,
        }
    }
}

/// Analysis capability the scheduler runs in the background.
///
/// A seam rather than a concrete type so scheduling is testable with a
/// scripted analyzer.
pub trait FrameAnalyzer: Send + Sync + 'static {
    fn analyze(&self, frame: &Frame) -> Vec<FaceCrop>;
}

/// Three-stage face analyzer.
///
/// Detects candidate faces, then eyes and nose confined to each face
/// region. A face is validated only when exactly two eyes and exactly
/// one nose are found inside it; the asymmetric exact-count rule trades
/// recall for precision, silently dropping partially occluded faces.
pub struct FaceAnalyzer {
    face_detector: Arc<dyn RegionDetector>,
    eye_detector: Arc<dyn RegionDetector>,
    nose_detector: Arc<dyn RegionDetector>,
    config: AnalyzerConfig,
}

impl FaceAnalyzer {
    pub fn new(
        face_detector: Arc<dyn RegionDetector>,
        eye_detector: Arc<dyn RegionDetector>,
        nose_detector: Arc<dyn RegionDetector>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            face_detector,
            eye_detector,
            nose_detector,
            config,
        }
    }
}

impl FrameAnalyzer for FaceAnalyzer {
    fn analyze(&self, frame: &Frame) -> Vec<FaceCrop> {
        // Normalise brightness before any detection pass
        let gray = equalize_histogram(&frame.to_grayscale());

        let faces = self.face_detector.detect(&gray, &self.config.face);
        debug!(candidates = faces.len(), sequence = frame.sequence, "Face search");

        let mut crops = Vec::new();
        for face in faces {
            let Some(mut crop) = frame.crop(face.x, face.y, face.width, face.height) else {
                continue;
            };
            let face_gray = sub_image(&gray, &face);

            // Eye and nose coordinates are relative to the face crop
            let eyes = self.eye_detector.detect(&face_gray, &self.config.eye);
            let noses = self.nose_detector.detect(&face_gray, &self.config.nose);

            if eyes.len() != 2 || noses.len() != 1 {
                continue;
            }

            if self.config.draw_markers {
                draw_markers(&mut crop, &eyes, &noses[0]);
            }
            crops.push(FaceCrop {
                image: crop,
                region: face,
            });
        }
        crops
    }
}

fn sub_image(gray: &GrayImage, region: &Region) -> GrayImage {
    imageops::crop_imm(gray, region.x, region.y, region.width, region.height).to_image()
}

/// Ellipse centred on each eye region, rectangle bounding the nose
fn draw_markers(crop: &mut RgbImage, eyes: &[Region], nose: &Region) {
    for eye in eyes {
        draw_hollow_ellipse_mut(
            crop,
            eye.center(),
            (eye.width / 2) as i32,
            (eye.height / 2) as i32,
            EYE_MARKER_COLOR,
        );
    }
    draw_hollow_rect_mut(
        crop,
        Rect::at(nose.x as i32, nose.y as i32).of_size(nose.width.max(1), nose.height.max(1)),
        NOSE_MARKER_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    /// Detector returning a fixed script of regions
    struct Scripted(Vec<Region>);

    impl RegionDetector for Scripted {
        fn detect(&self, _image: &GrayImage, _params: &DetectParams) -> Vec<Region> {
            self.0.clone()
        }
    }

    fn frame() -> Frame {
        Frame::new(RgbImage::new(200, 200), Local::now(), 7)
    }

    fn analyzer(eyes: Vec<Region>, noses: Vec<Region>, draw_markers: bool) -> FaceAnalyzer {
        FaceAnalyzer::new(
            Arc::new(Scripted(vec![Region::new(50, 50, 100, 100)])),
            Arc::new(Scripted(eyes)),
            Arc::new(Scripted(noses)),
            AnalyzerConfig {
                draw_markers,
                ..Default::default()
            },
        )
    }

    fn two_eyes() -> Vec<Region> {
        vec![Region::new(15, 25, 20, 15), Region::new(60, 25, 20, 15)]
    }

    fn one_nose() -> Vec<Region> {
        vec![Region::new(40, 45, 20, 25)]
    }

    #[test]
    fn test_valid_face_is_emitted() {
        let crops = analyzer(two_eyes(), one_nose(), false).analyze(&frame());
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].region, Region::new(50, 50, 100, 100));
        assert_eq!(crops[0].image.dimensions(), (100, 100));
    }

    #[test]
    fn test_one_eye_is_rejected() {
        let crops =
            analyzer(vec![Region::new(15, 25, 20, 15)], one_nose(), false).analyze(&frame());
        assert!(crops.is_empty());
    }

    #[test]
    fn test_three_eyes_are_rejected() {
        let mut eyes = two_eyes();
        eyes.push(Region::new(40, 25, 20, 15));
        let crops = analyzer(eyes, one_nose(), false).analyze(&frame());
        assert!(crops.is_empty());
    }

    #[test]
    fn test_two_noses_are_rejected() {
        let mut noses = one_nose();
        noses.push(Region::new(10, 60, 20, 25));
        let crops = analyzer(two_eyes(), noses, false).analyze(&frame());
        assert!(crops.is_empty());
    }

    #[test]
    fn test_no_faces_found() {
        let analyzer = FaceAnalyzer::new(
            Arc::new(Scripted(vec![])),
            Arc::new(Scripted(two_eyes())),
            Arc::new(Scripted(one_nose())),
            AnalyzerConfig::default(),
        );
        assert!(analyzer.analyze(&frame()).is_empty());
    }

    #[test]
    fn test_face_exceeding_frame_is_skipped() {
        let analyzer = FaceAnalyzer::new(
            Arc::new(Scripted(vec![Region::new(150, 150, 100, 100)])),
            Arc::new(Scripted(two_eyes())),
            Arc::new(Scripted(one_nose())),
            AnalyzerConfig::default(),
        );
        assert!(analyzer.analyze(&frame()).is_empty());
    }

    #[test]
    fn test_markers_drawn_on_crop() {
        let crops = analyzer(two_eyes(), one_nose(), true).analyze(&frame());
        let nose = &one_nose()[0];
        // Top-left corner of the hollow nose rectangle
        assert_eq!(
            crops[0].image.get_pixel(nose.x, nose.y),
            &NOSE_MARKER_COLOR
        );
    }

    #[test]
    fn test_markers_suppressed_in_training() {
        let crops = analyzer(two_eyes(), one_nose(), false).analyze(&frame());
        let nose = &one_nose()[0];
        assert_eq!(crops[0].image.get_pixel(nose.x, nose.y), &Rgb([0, 0, 0]));
    }
}
