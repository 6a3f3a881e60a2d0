use std::collections::HashMap;
use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

/// Errors that can occur while uploading a texture
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Invalid texture dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// Converts an RGBA raster into an egui image
pub fn to_color_image(raster: &RgbaImage) -> Result<ColorImage, TextureError> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions(width, height));
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        raster.as_raw(),
    ))
}

/// Caches uploaded textures for frames and history thumbnails
pub struct TextureManager {
    /// Cache of textures by (image_id, version)
    texture_cache: HashMap<(usize, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(usize, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets or creates a texture for the given image version
    pub fn get_or_create_texture<F>(
        &mut self,
        image_id: usize,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureError>
    where
        F: FnOnce() -> Result<ColorImage, TextureError>,
    {
        let cache_key = (image_id, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        // A newer version of the same image replaces the older ones
        self.invalidate_older_versions(image_id, version);
        self.prune_cache_if_needed();

        let image = generator()?;
        let name = format!("image_{}_v{}", image_id, version);
        let handle = ctx.load_texture(&name, image, TextureOptions::LINEAR);

        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);

        Ok(handle.id())
    }

    /// Invalidates all textures for a specific image
    pub fn invalidate_image(&mut self, image_id: usize) {
        self.retain(|(id, _)| *id != image_id);
    }

    fn invalidate_older_versions(&mut self, image_id: usize, version: u64) {
        self.retain(|(id, v)| *id != image_id || *v > version);
    }

    fn retain(&mut self, keep: impl Fn(&(usize, u64)) -> bool) {
        self.texture_cache.retain(|key, _| keep(key));
        self.last_used.retain(|key, _| keep(key));
    }

    /// Prunes the cache so that one more entry still fits
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<((usize, u64), u64)> = self.last_used
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() + 1 - self.max_cache_size.max(1);
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    /// Clears all textures from the cache
    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    pub fn get_texture(&self, image_id: usize, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(image_id, version))
    }
}
