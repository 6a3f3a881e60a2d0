use futures::future::BoxFuture;
use reqwest::StatusCode;

use crate::config::AppConfig;
use crate::error::{EditorError, Result};
use crate::image::{Image, ImageRef};
use super::{DEFAULT_FAILURE, EditPayload, EditResponse, EditService};

/// Posts edit payloads as JSON to a proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyEditService {
    client: reqwest::Client,
    url: String,
}

impl ProxyEditService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.proxy_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Maps a proxy reply (status + body) to an image or an error.
///
/// A non-2xx status fails with the body's `message` when there is one. A 2xx
/// reply must carry `result`; a 2xx reply with only `message` is a failure too.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<ImageRef> {
    let parsed: Option<EditResponse> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let message = parsed
            .and_then(|r| r.message)
            .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
        return Err(EditorError::EditRequest(format!("{} ({})", message, status)));
    }

    match parsed {
        Some(EditResponse {
            result: Some(result),
            ..
        }) => Image::from_data_uri(&result),
        Some(EditResponse {
            message: Some(message),
            ..
        }) => Err(EditorError::EditRequest(message)),
        _ => Err(EditorError::EditRequest(DEFAULT_FAILURE.to_string())),
    }
}

impl EditService for ProxyEditService {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn submit(&self, payload: EditPayload) -> BoxFuture<'static, Result<ImageRef>> {
        let client = self.client.clone();
        let url = self.url.clone();

        Box::pin(async move {
            let body = serde_json::to_vec(&payload)?;
            log::debug!("POST {} ({} bytes)", url, body.len());

            let response = client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            interpret_response(status, &text)
        })
    }
}
