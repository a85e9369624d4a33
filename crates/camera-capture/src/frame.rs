//! Video frame type and pixel-level helpers

use chrono::{DateTime, Local};
use image::{imageops, GrayImage, RgbImage};

use crate::Orientation;

/// A single acquired color frame.
///
/// Owned exclusively by the session loop for the duration of one
/// iteration; cloned before being handed to a background task so the
/// task never aliases the loop's working copy.
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGB pixel data
    pub image: RgbImage,
    /// Capture wall-clock timestamp
    pub captured_at: DateTime<Local>,
    /// Frame sequence number
    pub sequence: u64,
}

impl Frame {
    /// Create a new frame from decoded RGB pixels
    pub fn new(image: RgbImage, captured_at: DateTime<Local>, sequence: u64) -> Self {
        Self {
            image,
            captured_at,
            sequence,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Correct for the physical camera mount
    pub fn orient(&mut self, orientation: Orientation) {
        match orientation {
            Orientation::Upright => {}
            Orientation::Rotated180 => {
                self.image = imageops::rotate180(&self.image);
            }
        }
    }

    /// Convert to grayscale
    pub fn to_grayscale(&self) -> GrayImage {
        imageops::grayscale(&self.image)
    }

    /// Crop a region of the frame, or `None` if it exceeds the bounds
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<RgbImage> {
        if x.saturating_add(w) > self.width() || y.saturating_add(h) > self.height() {
            return None;
        }
        Some(imageops::crop_imm(&self.image, x, y, w, h).to_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_frame(w: u32, h: u32) -> Frame {
        let mut image = RgbImage::new(w, h);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        Frame::new(image, Local::now(), 0)
    }

    #[test]
    fn test_rotate180_moves_corner_pixel() {
        let mut frame = test_frame(4, 2);
        frame.orient(Orientation::Rotated180);
        assert_eq!(frame.image.get_pixel(3, 1), &Rgb([255, 0, 0]));
        assert_eq!(frame.image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_upright_is_identity() {
        let mut frame = test_frame(4, 2);
        frame.orient(Orientation::Upright);
        assert_eq!(frame.image.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_crop_within_bounds() {
        let frame = test_frame(10, 10);
        let crop = frame.crop(2, 2, 4, 4).unwrap();
        assert_eq!(crop.dimensions(), (4, 4));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let frame = test_frame(10, 10);
        assert!(frame.crop(8, 8, 4, 4).is_none());
    }

    #[test]
    fn test_grayscale_dimensions() {
        let frame = test_frame(6, 4);
        let gray = frame.to_grayscale();
        assert_eq!(gray.dimensions(), (6, 4));
    }
}
