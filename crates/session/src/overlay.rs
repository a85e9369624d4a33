//! Frame overlay composition
//!
//! Draws the cached face crop, recognition details, mode/status lines,
//! FPS, wall clock, and the retained distance reading onto each frame
//! before it is emitted.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use camera_capture::Frame;
use chrono::{DateTime, Local};
use face_registry::SAMPLE_SIZE;
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::warn;

/// Inset of the crop and all text from the frame edges
const MARGIN: i32 = 10;
/// Vertical advance between stacked text lines
const LINE_SMALL: i32 = 14;
const LINE_LARGE: i32 = 18;

const SCALE_SMALL: f32 = 12.0;
const SCALE_LARGE: f32 = 16.0;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Renders overlay elements onto frames.
///
/// The font is a collaborator-supplied asset; when it cannot be loaded
/// the crop inset is still composited and text rendering is skipped.
pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = font_path.and_then(|path| match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!("Invalid overlay font {}: {e}", path.display());
                    None
                }
            },
            Err(e) => {
                warn!("Cannot read overlay font {}: {e}", path.display());
                None
            }
        });
        if font.is_none() {
            warn!("Overlay text disabled; no usable font");
        }
        Self { font }
    }

    /// Copy the cached crop into the top-left corner with a 2 px border
    pub fn composite_crop(&self, frame: &mut Frame, crop: &RgbImage) {
        let (w, h) = crop.dimensions();
        imageops::replace(&mut frame.image, crop, MARGIN as i64, MARGIN as i64);
        for inset in 1..=2 {
            draw_hollow_rect_mut(
                &mut frame.image,
                Rect::at(MARGIN - inset, MARGIN - inset)
                    .of_size(w + 2 * inset as u32, h + 2 * inset as u32),
                BORDER_COLOR,
            );
        }
    }

    /// Identity, confidence, and capture date/time below the crop
    pub fn recognition_block(
        &self,
        frame: &mut Frame,
        name: &str,
        confidence: f64,
        captured_at: DateTime<Local>,
    ) {
        let crop_bottom = MARGIN + SAMPLE_SIZE as i32;
        let lines = [
            format!("Name: {name}"),
            format!("Confidence: {confidence:.2}"),
            format!("Date: {}", captured_at.format("%d/%m/%Y")),
            format!("Time: {}", captured_at.format("%H:%M:%S")),
        ];
        for (i, line) in lines.iter().enumerate() {
            self.draw(
                frame,
                line,
                MARGIN,
                crop_bottom + MARGIN + i as i32 * LINE_SMALL,
                SCALE_SMALL,
            );
        }
    }

    /// Mode lines bottom-left, FPS and wall clock bottom-right
    pub fn status_text(
        &self,
        frame: &mut Frame,
        analysis_enabled: bool,
        training: Option<(&str, u32, u32)>,
        fps: u64,
        now: DateTime<Local>,
    ) {
        let lower = frame.height() as i32 - LINE_LARGE - MARGIN;
        let upper = lower - LINE_LARGE;

        let mode = if analysis_enabled {
            "Face Recognition Mode: ON"
        } else {
            "Face Recognition Mode: OFF"
        };
        self.draw(frame, mode, MARGIN, upper, SCALE_LARGE);

        let training_line = match training {
            Some((identity, count, max)) => {
                format!("Training Mode: ON ({identity}...{count}/{max})")
            }
            None => "Training Mode: OFF".to_string(),
        };
        self.draw(frame, &training_line, MARGIN, lower, SCALE_LARGE);

        self.draw_right(frame, &format!("FPS: {fps}"), upper, SCALE_LARGE);
        self.draw_right(
            frame,
            &now.format("%d/%m/%Y %H:%M:%S").to_string(),
            lower,
            SCALE_LARGE,
        );
    }

    /// Retained distance reading, top-right
    pub fn distance_text(&self, frame: &mut Frame, distance_cm: f64) {
        self.draw_right(
            frame,
            &format!("Distance: {distance_cm:.2}cm"),
            MARGIN,
            SCALE_LARGE,
        );
    }

    fn draw(&self, frame: &mut Frame, text: &str, x: i32, y: i32, scale: f32) {
        if let Some(font) = &self.font {
            draw_text_mut(
                &mut frame.image,
                TEXT_COLOR,
                x,
                y,
                PxScale::from(scale),
                font,
                text,
            );
        }
    }

    fn draw_right(&self, frame: &mut Frame, text: &str, y: i32, scale: f32) {
        if let Some(font) = &self.font {
            let (text_w, _) = text_size(PxScale::from(scale), font, text);
            let x = frame.width() as i32 - text_w as i32 - MARGIN;
            draw_text_mut(
                &mut frame.image,
                TEXT_COLOR,
                x,
                y,
                PxScale::from(scale),
                font,
                text,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame() -> Frame {
        Frame::new(RgbImage::new(640, 480), Local::now(), 0)
    }

    #[test]
    fn test_composite_crop_copies_pixels_and_border() {
        let renderer = OverlayRenderer::new(None);
        let mut frame = frame();
        let crop = RgbImage::from_pixel(100, 100, Rgb([9, 9, 9]));

        renderer.composite_crop(&mut frame, &crop);

        // Crop content at the inset origin
        assert_eq!(frame.image.get_pixel(10, 10), &Rgb([9, 9, 9]));
        assert_eq!(frame.image.get_pixel(109, 109), &Rgb([9, 9, 9]));
        // Border ring around it
        assert_eq!(frame.image.get_pixel(9, 10), &BORDER_COLOR);
        assert_eq!(frame.image.get_pixel(8, 10), &BORDER_COLOR);
        // Outside the border untouched
        assert_eq!(frame.image.get_pixel(7, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_text_skipped_without_font() {
        let renderer = OverlayRenderer::new(None);
        let mut frame = frame();
        renderer.status_text(&mut frame, true, Some(("carol", 1, 10)), 12, Local::now());
        renderer.distance_text(&mut frame, 42.0);
        renderer.recognition_block(&mut frame, "carol", 1.5, Local::now());
        // No font: frame must be untouched
        assert!(frame.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_missing_font_path_degrades() {
        let renderer = OverlayRenderer::new(Some(Path::new("/nonexistent/font.ttf")));
        let mut frame = frame();
        renderer.distance_text(&mut frame, 42.0);
        assert!(frame.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
