use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::GenerationError;
use crate::config::ProviderConfig;

/// Every request asks for exactly this size.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Undecoded provider response body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    body: String,
    json: Option<Value>,
}

impl RawResponse {
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let json = serde_json::from_str(&body).ok();
        Self { body, json }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}

/// Capability to talk to an image generation provider.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Text-to-image with `n = 1` at `IMAGE_SIZE`.
    async fn create_image(&self, prompt: &str) -> Result<RawResponse, GenerationError>;

    /// Edit a PNG with an alpha channel, `n = 1` at `IMAGE_SIZE`.
    async fn edit_image(&self, image: &[u8], prompt: &str) -> Result<RawResponse, GenerationError>;

    /// Fetch a provider-hosted artifact.
    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError>;
}

#[derive(Serialize)]
struct CreateImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// OpenAI-compatible images API over HTTP.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    create_model: String,
    edit_model: String,
    download_timeout: std::time::Duration,
    max_download_bytes: usize,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, config: &ProviderConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            create_model: config.create_model.clone(),
            edit_model: config.edit_model.clone(),
            download_timeout: config.download_timeout(),
            max_download_bytes: config.max_download_bytes,
        })
    }

    /// Build the provider if an API key is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Option<Self>, GenerationError> {
        config.api_key().map(|key| Self::new(key, config)).transpose()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn into_raw(response: reqwest::Response) -> Result<RawResponse, GenerationError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(GenerationError::ProviderCallFailed {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), bytes = text.len(), "Provider responded");
        Ok(RawResponse::new(text))
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn create_image(&self, prompt: &str) -> Result<RawResponse, GenerationError> {
        let request = CreateImageRequest {
            model: &self.create_model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };
        let response = self
            .client
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Self::into_raw(response).await
    }

    async fn edit_image(&self, image: &[u8], prompt: &str) -> Result<RawResponse, GenerationError> {
        let image_part = Part::bytes(image.to_vec())
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("image", image_part)
            .text("prompt", prompt.to_owned())
            .text("model", self.edit_model.clone())
            .text("n", "1")
            .text("size", IMAGE_SIZE);

        let response = self
            .client
            .post(self.endpoint("images/edits"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Self::into_raw(response).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let mut response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GenerationError::DownloadFailed(e.to_string()))?;

        let limit = self.max_download_bytes;
        if let Some(len) = response.content_length()
            && len > limit as u64
        {
            return Err(GenerationError::DownloadFailed(format!(
                "artifact is {len} bytes, limit is {limit}"
            )));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| GenerationError::DownloadFailed(e.to_string()))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(GenerationError::DownloadFailed(format!(
                    "artifact exceeds {limit} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}
