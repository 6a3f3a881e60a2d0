//! Direct client for the Gemini `generateContent` REST endpoint.
//!
//! Parts are sent in a fixed order: the text prompt, the primary image, the
//! mask (always labelled PNG) and then reference images in input order. The
//! reply is scanned part by part; text parts are logged and the first inline
//! image wins.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::data_uri;
use crate::error::{EditorError, Result};
use crate::image::{Image, ImageRef};
use super::{DEFAULT_FAILURE, EditPayload, EditService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn image(mime_type: &str, uri: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data_uri::strip_prefix(uri).to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Builds the model request for an edit payload
pub fn build_generate_request(payload: &EditPayload) -> GenerateContentRequest {
    let mut parts = vec![
        Part::text(&payload.prompt),
        Part::image(data_uri::mime_type(&payload.image_base64), &payload.image_base64),
    ];

    if let Some(mask) = &payload.mask_base64 {
        parts.push(Part::image(data_uri::DEFAULT_MIME, mask));
    }

    if let Some(files) = &payload.user_files {
        parts.extend(
            files
                .iter()
                .map(|file| Part::image(data_uri::mime_type(&file.url), &file.url)),
        );
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            image_config: payload.aspect_ratio.as_ref().map(|ratio| ImageConfig {
                aspect_ratio: ratio.clone(),
            }),
        },
    }
}

/// Returns the first inline image of the first candidate as a PNG image
pub fn first_inline_image(response: &GenerateContentResponse) -> Result<ImageRef> {
    let parts = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    for part in parts {
        if let Some(text) = &part.text {
            log::info!("Model says: {}", text);
        } else if let Some(inline) = &part.inline_data {
            return Image::from_data_uri(&format!("data:image/png;base64,{}", inline.data));
        }
    }

    log::warn!("Model reply contained no image part");
    Err(EditorError::ModelNoImage)
}

/// Calls the Gemini image model directly
#[derive(Debug, Clone)]
pub struct GeminiEditService {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiEditService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| EditorError::Config("missing Gemini API key".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.gemini_endpoint.trim_end_matches('/'),
                config.gemini_model
            ),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EditService for GeminiEditService {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn submit(&self, payload: EditPayload) -> BoxFuture<'static, Result<ImageRef>> {
        let client = self.client.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            let request = build_generate_request(&payload);
            let body = serde_json::to_vec(&request)?;
            log::debug!(
                "POST {} ({} parts, {} bytes)",
                url,
                request.contents[0].parts.len(),
                body.len()
            );

            let response = client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<ApiErrorBody>(&text)
                    .map(|body| body.error.message)
                    .unwrap_or_else(|_| DEFAULT_FAILURE.to_string());
                return Err(EditorError::EditRequest(format!("{} ({})", message, status)));
            }

            let reply: GenerateContentResponse = serde_json::from_str(&text)?;
            first_inline_image(&reply)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_url() {
        let config = AppConfig {
            gemini_api_key: Some("k".to_string()),
            gemini_endpoint: "https://example.test/v1beta/".to_string(),
            gemini_model: "img-model".to_string(),
            ..AppConfig::default()
        };
        let service = GeminiEditService::new(&config).unwrap();
        assert_eq!(service.url(), "https://example.test/v1beta/models/img-model:generateContent");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            GeminiEditService::new(&AppConfig::default()),
            Err(EditorError::Config(_))
        ));
    }

    #[test]
    fn test_aspect_ratio_only_when_given() {
        let payload = EditPayload {
            image_base64: "data:image/png;base64,AAAA".to_string(),
            prompt: "p".to_string(),
            mask_base64: None,
            user_files: None,
            aspect_ratio: None,
        };
        let json = serde_json::to_value(build_generate_request(&payload)).unwrap();
        assert!(json["generationConfig"].get("imageConfig").is_none());

        let payload = EditPayload {
            aspect_ratio: Some("4:3".to_string()),
            ..payload
        };
        let json = serde_json::to_value(build_generate_request(&payload)).unwrap();
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "4:3");
    }
}
