use std::time::Duration;
use thiserror::Error;

/// Errors raised by the editor core and the edit services
#[derive(Debug, Error)]
pub enum EditorError {
    /// An edit was submitted while another one is still in flight
    #[error("an edit request is already in flight")]
    Concurrency,

    /// The edit service rejected the request or the transport failed
    #[error("edit request failed: {0}")]
    EditRequest(String),

    /// The model answered without any inline image part
    #[error("the model returned no image")]
    ModelNoImage,

    #[error("edit request timed out after {0:?}")]
    Timeout(Duration),

    /// The history was replaced while the request was in flight
    #[error("edit result discarded: a new base image was loaded")]
    Superseded,

    #[error("no image loaded")]
    NoImage,

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl EditorError {
    /// True for failures reported by (or on the way to) the edit service,
    /// including replies that could not be decoded.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::EditRequest(_)
                | Self::ModelNoImage
                | Self::Timeout(_)
                | Self::Http(_)
                | Self::InvalidDataUri(_)
                | Self::Base64(_)
                | Self::Json(_)
        )
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_replies_are_request_failures() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(EditorError::from(json).is_request_failure());
        assert!(EditorError::InvalidDataUri("no comma".into()).is_request_failure());
        assert!(crate::data_uri::decode("data:image/png;base64,@@@@")
            .unwrap_err()
            .is_request_failure());

        assert!(!EditorError::NoImage.is_request_failure());
        assert!(!EditorError::Concurrency.is_request_failure());
    }
}
