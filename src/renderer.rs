// src/renderer.rs
use std::sync::atomic::{AtomicU64, Ordering};

use image::{GrayImage, Luma, Rgba, RgbaImage, imageops};

use crate::error::Result;
use crate::image::Image;
use crate::mask::MaskCanvas;

/// Mask values above this count as selected
pub const MASK_THRESHOLD: u8 = 10;

/// Overlay color for selected pixels (red at ~40% opacity)
pub const HIGHLIGHT: Rgba<u8> = Rgba([255, 0, 0, 100]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// Frame versions are unique across renderers, so a rebuilt surface never
// reuses a texture cached for an earlier one.
static NEXT_FRAME_VERSION: AtomicU64 = AtomicU64::new(1);

fn overlay_pixel(mask: &Luma<u8>) -> Rgba<u8> {
    if mask.0[0] > MASK_THRESHOLD {
        HIGHLIGHT
    } else {
        TRANSPARENT
    }
}

/// Recolors a mask into a preview overlay: selected pixels become
/// [`HIGHLIGHT`], everything else fully transparent.
pub fn colorize_mask(mask: &GrayImage) -> RgbaImage {
    let mut overlay = RgbaImage::new(mask.width(), mask.height());
    colorize_into(mask, &mut overlay);
    overlay
}

fn colorize_into(mask: &GrayImage, overlay: &mut RgbaImage) {
    for (dst, src) in overlay.pixels_mut().zip(mask.pixels()) {
        *dst = overlay_pixel(src);
    }
}

/// Produces the on-screen frame for one base image.
///
/// A renderer is bound to the image it was created from. Loading a different
/// image means building a new renderer (see [`Surface`]).
#[derive(Debug)]
pub struct Renderer {
    image_id: usize,
    base: RgbaImage,
    overlay: RgbaImage,
    frame: RgbaImage,
    frame_version: u64,
}

impl Renderer {
    pub fn new(image_id: usize, base: RgbaImage) -> Self {
        let (width, height) = base.dimensions();
        Self {
            image_id,
            frame: base.clone(),
            overlay: RgbaImage::new(width, height),
            base,
            frame_version: 0,
        }
    }

    /// Renders the current frame
    ///
    /// Args:
    ///     mask (MaskCanvas): Selection to highlight; must match the base size
    pub fn render(&mut self, mask: &MaskCanvas) {
        // 1. clear and draw the base image at native resolution
        self.frame.copy_from_slice(&self.base);

        // 2. recolor the mask into the overlay buffer
        let pixels = mask.pixels();
        if pixels.dimensions() == self.overlay.dimensions() {
            colorize_into(pixels, &mut self.overlay);
            // 3. source-over blend
            imageops::overlay(&mut self.frame, &self.overlay, 0, 0);
        } else {
            log::warn!(
                "Mask {:?} does not match image {:?}; drawing base only",
                pixels.dimensions(),
                self.overlay.dimensions()
            );
        }

        self.frame_version = NEXT_FRAME_VERSION.fetch_add(1, Ordering::Relaxed);
    }

    pub fn image_id(&self) -> usize {
        self.image_id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Changes on every render and is never shared with another renderer.
    /// Used as the texture cache version.
    pub fn frame_version(&self) -> u64 {
        self.frame_version
    }
}

/// Everything tied to the currently displayed image: its mask and renderer.
///
/// Built as a single value so that the mask and the frame always describe
/// the same image.
#[derive(Debug)]
pub struct Surface {
    pub mask: MaskCanvas,
    pub renderer: Renderer,
}

impl Surface {
    /// Decodes `image`, allocates a blank mask of the same size and renders
    /// the first frame.
    pub fn for_image(image: &Image) -> Result<Self> {
        let base = image.decode()?;
        let (width, height) = base.dimensions();
        let mask = MaskCanvas::new(width, height).ok_or(crate::error::EditorError::NoImage)?;
        let mut renderer = Renderer::new(image.id(), base);
        renderer.render(&mask);
        log::debug!("Prepared {}x{} surface for image {}", width, height, image.id());
        Ok(Self { mask, renderer })
    }

    pub fn image_id(&self) -> usize {
        self.renderer.image_id()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.renderer.dimensions()
    }

    pub fn redraw(&mut self) {
        self.renderer.render(&self.mask);
    }
}
