//! Edit service seam.
//!
//! The editor core talks to the generative model only through
//! [`EditService`]. Two transports are provided:
//!
//! - [`ProxyEditService`] posts the JSON payload to an HTTP proxy that owns
//!   the model credentials.
//! - [`GeminiEditService`] calls the Gemini `generateContent` endpoint
//!   directly.
//!
//! [`EditDispatcher`] runs a service future on a background runtime and hands
//! the result back to the UI thread.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::ImageRef;

mod dispatch;
mod gemini;
mod proxy;

pub use dispatch::EditDispatcher;
pub use gemini::{
    GeminiEditService, GenerateContentRequest, GenerateContentResponse, build_generate_request,
    first_inline_image,
};
pub use proxy::{ProxyEditService, interpret_response};

/// A reference file as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFile {
    pub url: String,
    pub media_type: String,
    pub filename: String,
}

/// Request body of the edit endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPayload {
    pub image_base64: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_files: Option<Vec<UserFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

/// Response body of the edit endpoint: `{ result }` or `{ message }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Fallback message when the service gives no detail
pub const DEFAULT_FAILURE: &str = "failed to generate.";

/// Something that can turn an edit payload into a new image
pub trait EditService: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Submits one edit. The returned future must not borrow `self`, so it can
    /// be moved onto a background runtime.
    fn submit(&self, payload: EditPayload) -> BoxFuture<'static, Result<ImageRef>>;
}
