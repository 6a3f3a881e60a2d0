//! Off-screen selection bitmap.
//!
//! The mask has the same pixel dimensions as the displayed image. A pixel is
//! either 255 (selected for the edit) or 0 (left unchanged). Strokes are
//! rasterized with round caps and joins by testing each pixel center against
//! the stroke capsule, so no anti-aliasing ever produces grey values.

use egui::pos2;
use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::error::Result;
use crate::image::{Image, ImageRef};
use crate::renderer::MASK_THRESHOLD;
use crate::stroke::StrokeSegment;

#[derive(Debug, Clone)]
pub struct MaskCanvas {
    pixels: GrayImage,
}

impl MaskCanvas {
    /// Creates an all-black mask. Returns `None` when either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            pixels: GrayImage::new(width, height),
        })
    }

    /// Reallocates the bitmap as all-black. Zero dimensions leave the mask as it was.
    pub fn reset(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring mask reset to {}x{}", width, height);
            return;
        }
        self.pixels = GrayImage::new(width, height);
    }

    /// Clears every pixel without changing dimensions
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    /// Raw mask value, or `None` outside the bitmap
    pub fn value_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.value_at(x, y).is_some_and(|v| v > MASK_THRESHOLD)
    }

    pub fn selected_pixel_count(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[0] > MASK_THRESHOLD).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[0] <= MASK_THRESHOLD)
    }

    /// Rasterizes a stroke segment directly into the bitmap.
    pub fn apply_stroke(&mut self, segment: &StrokeSegment) {
        let radius = segment.radius.max(0.0);
        let (width, height) = self.pixels.dimensions();

        let min_x = segment.start.x.min(segment.end.x) - radius;
        let max_x = segment.start.x.max(segment.end.x) + radius;
        let min_y = segment.start.y.min(segment.end.y) - radius;
        let max_y = segment.start.y.max(segment.end.y) + radius;

        // Entirely off-canvas
        if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
            return;
        }

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil() as u32).min(width - 1);
        let y1 = (max_y.ceil() as u32).min(height - 1);

        let value = Luma([segment.mode.value()]);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                if segment.distance_to(center) <= radius {
                    self.pixels.put_pixel(x, y, value);
                }
            }
        }
    }

    /// Serializes the mask as an opaque black/white PNG.
    pub fn export_as_image(&self) -> Result<ImageRef> {
        let (width, height) = self.pixels.dimensions();
        let rgba = RgbaImage::from_fn(width, height, |x, y| {
            let v = self.pixels.get_pixel(x, y).0[0];
            Rgba([v, v, v, 255])
        });
        let image = Image::encode_png(&rgba)?;
        log::debug!(
            "Exported {}x{} mask ({} selected pixels, {} bytes)",
            width,
            height,
            self.selected_pixel_count(),
            image.data().len()
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::StrokeMode;

    #[test]
    fn test_new_rejects_empty() {
        assert!(MaskCanvas::new(0, 10).is_none());
        assert!(MaskCanvas::new(10, 0).is_none());
        assert!(MaskCanvas::new(1, 1).is_some());
    }

    #[test]
    fn test_reset_ignores_zero_dimensions() {
        let mut mask = MaskCanvas::new(8, 8).unwrap();
        mask.apply_stroke(&StrokeSegment::dot(pos2(4.0, 4.0), 2.0, StrokeMode::Paint));
        mask.reset(0, 5);
        assert_eq!(mask.dimensions(), (8, 8));
        assert!(!mask.is_blank());

        mask.reset(4, 6);
        assert_eq!(mask.dimensions(), (4, 6));
        assert!(mask.is_blank());
    }

    #[test]
    fn test_dot_fills_disk() {
        let mut mask = MaskCanvas::new(40, 40).unwrap();
        mask.apply_stroke(&StrokeSegment::dot(pos2(20.0, 20.0), 5.0, StrokeMode::Paint));

        assert!(mask.is_selected(20, 20));
        assert!(mask.is_selected(16, 20));
        assert!(mask.is_selected(20, 23));
        assert!(!mask.is_selected(26, 20));
        assert!(!mask.is_selected(20, 13));
        assert!(!mask.is_selected(25, 25));
    }

    #[test]
    fn test_line_and_erase() {
        let mut mask = MaskCanvas::new(50, 20).unwrap();
        mask.apply_stroke(&StrokeSegment::new(
            pos2(5.0, 10.0),
            pos2(45.0, 10.0),
            3.0,
            StrokeMode::Paint,
        ));
        for x in 5..45 {
            assert!(mask.is_selected(x, 10), "pixel {} should be painted", x);
        }
        assert!(!mask.is_selected(25, 15));

        mask.apply_stroke(&StrokeSegment::dot(pos2(25.0, 10.0), 4.0, StrokeMode::Erase));
        assert!(!mask.is_selected(25, 10));
        assert!(mask.is_selected(10, 10));
    }

    #[test]
    fn test_stroke_off_canvas_is_clipped() {
        let mut mask = MaskCanvas::new(10, 10).unwrap();
        mask.apply_stroke(&StrokeSegment::dot(pos2(-50.0, -50.0), 3.0, StrokeMode::Paint));
        assert!(mask.is_blank());

        mask.apply_stroke(&StrokeSegment::dot(pos2(9.5, 9.5), 30.0, StrokeMode::Paint));
        assert_eq!(mask.selected_pixel_count(), 100);
    }
}
