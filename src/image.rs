use image::{ImageFormat, RgbaImage};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::data_uri;
use crate::error::{EditorError, Result};

// Static counter for generating unique IDs
static NEXT_IMAGE_ID: AtomicUsize = AtomicUsize::new(1);

/// Immutable encoded raster. Every edit produces a new `Image`.
#[derive(Clone)]
pub struct Image {
    id: usize,             // Unique identifier, used as texture cache key
    data: Arc<[u8]>,       // Encoded bytes (PNG, JPEG, ...)
    mime: String,
}

// Define a reference-counted type alias for Image
pub type ImageRef = Arc<Image>;

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("mime", &self.mime)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Image {
    // Create a new immutable image from encoded bytes and their MIME type
    pub fn new(data: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        let id = NEXT_IMAGE_ID.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            data: data.into(),
            mime: mime.into(),
        }
    }

    // Create a new reference-counted Image
    pub fn new_ref(data: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> ImageRef {
        Arc::new(Self::new(data, mime))
    }

    /// Wraps encoded bytes, sniffing the MIME type from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<ImageRef> {
        let format = image::guess_format(&bytes)?;
        Ok(Self::new_ref(bytes, format.to_mime_type()))
    }

    /// Parses a `data:<mime>;base64,...` URI.
    pub fn from_data_uri(uri: &str) -> Result<ImageRef> {
        let (mime, bytes) = data_uri::decode(uri)?;
        Ok(Self::new_ref(bytes, mime))
    }

    /// Encodes a raster losslessly as PNG.
    pub fn encode_png(raster: &RgbaImage) -> Result<ImageRef> {
        let mut buf = Vec::new();
        raster.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(Self::new_ref(buf, "image/png"))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn to_data_uri(&self) -> String {
        data_uri::encode(&self.mime, &self.data)
    }

    /// Decodes to an RGBA raster. The declared MIME type is not trusted;
    /// the format is detected from the bytes.
    pub fn decode(&self) -> Result<RgbaImage> {
        let decoded = image::load_from_memory(&self.data)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(EditorError::InvalidDataUri("image has no pixels".to_string()));
        }
        Ok(decoded.to_rgba8())
    }

    /// Suggested file extension for saving or uploading.
    pub fn extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.mime)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }
}
