//! `data:<mime>;base64,<payload>` helpers.
//!
//! A MIME part that is not an `image/...` type is reported as PNG.

use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EditorError, Result};

pub const DEFAULT_MIME: &str = "image/png";

static MIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[a-zA-Z+]+);base64,").expect("valid mime regex"));

static PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(.*);base64,").expect("valid prefix regex"));

/// Returns the image MIME type declared by a data URI, or `image/png`.
pub fn mime_type(data_uri: &str) -> &str {
    MIME_PATTERN
        .captures(data_uri)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_MIME, |m| m.as_str())
}

/// Strips the `data:...;base64,` prefix. Input without a prefix is returned as-is.
pub fn strip_prefix(data_uri: &str) -> &str {
    match PREFIX_PATTERN.find(data_uri) {
        Some(prefix) => &data_uri[prefix.end()..],
        None => data_uri,
    }
}

/// Builds a data URI from raw bytes.
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// Decodes a data URI into its MIME type and raw bytes.
pub fn decode(data_uri: &str) -> Result<(String, Vec<u8>)> {
    let trimmed = data_uri.trim();
    if !trimmed.starts_with("data:") {
        return Err(EditorError::InvalidDataUri("missing data: scheme".to_string()));
    }
    if !PREFIX_PATTERN.is_match(trimmed) {
        return Err(EditorError::InvalidDataUri("missing ;base64, marker".to_string()));
    }

    let mime = mime_type(trimmed).to_string();
    let bytes = general_purpose::STANDARD.decode(strip_prefix(trimmed))?;
    if bytes.is_empty() {
        return Err(EditorError::InvalidDataUri("empty payload".to_string()));
    }
    Ok((mime, bytes))
}
