use std::sync::Arc;
use std::time::Duration;

use atelier_common::NormalizedImage;
use tracing::{info, warn};

use super::decode::{Decoded, decode_response};
use super::error::GenerationError;
use super::provider::{ImageProvider, RawResponse};
use super::{Artifact, GenerationMode, GenerationOutcome, GenerationRequest, OutcomeSource};
use crate::config::ProviderConfig;

/// Prompt used when an edit is retried through the create endpoint.
pub fn variation_prompt(prompt: &str) -> String {
    format!("a variation of the image with {prompt}")
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Bound on a single provider call.
    pub call_timeout: Duration,
    /// Bound on downloading a provider-hosted artifact.
    pub download_timeout: Duration,
    /// Download remote URLs; otherwise hand them through untouched.
    pub fetch_remote: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from(&ProviderConfig::default())
    }
}

impl From<&ProviderConfig> for ClientSettings {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            call_timeout: config.timeout(),
            download_timeout: config.download_timeout(),
            fetch_remote: config.fetch_remote,
        }
    }
}

enum ProviderCall<'a> {
    Create { prompt: &'a str },
    Edit { image: &'a [u8], prompt: &'a str },
}

impl ProviderCall<'_> {
    fn endpoint(&self) -> &'static str {
        match self {
            ProviderCall::Create { .. } => "create",
            ProviderCall::Edit { .. } => "edit",
        }
    }

    async fn send(&self, provider: &dyn ImageProvider) -> Result<RawResponse, GenerationError> {
        match *self {
            ProviderCall::Create { prompt } => provider.create_image(prompt).await,
            ProviderCall::Edit { image, prompt } => provider.edit_image(image, prompt).await,
        }
    }
}

/// Calls the provider for one request and never fails: every error walks down
/// the ladder edit -> create with a rewritten prompt -> placeholder.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Option<Arc<dyn ImageProvider>>,
    settings: ClientSettings,
}

impl GenerationClient {
    pub fn new(provider: Option<Arc<dyn ImageProvider>>, settings: ClientSettings) -> Self {
        Self { provider, settings }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        normalized: Option<&NormalizedImage>,
    ) -> GenerationOutcome {
        let mode = request.mode.as_str();
        let Some(provider) = self.provider.as_deref() else {
            warn!(
                mode,
                stage = "placeholder",
                error = %GenerationError::ProviderUnavailable,
                "Skipping provider"
            );
            return GenerationOutcome::placeholder();
        };

        let primary = match (request.mode, normalized) {
            (GenerationMode::Create, _) => ProviderCall::Create {
                prompt: &request.prompt,
            },
            (GenerationMode::Edit, Some(image)) => ProviderCall::Edit {
                image: &image.bytes,
                prompt: &request.prompt,
            },
            (GenerationMode::Edit, None) => {
                warn!(mode, stage = "primary", "No normalized image for edit");
                return self.fallback(provider, request).await;
            }
        };

        match self.attempt(provider, &primary).await {
            Ok(artifact) => {
                info!(mode, stage = "primary", "Generation succeeded");
                GenerationOutcome {
                    artifact,
                    source: OutcomeSource::ProviderPrimary,
                }
            }
            Err(e) if request.mode == GenerationMode::Edit => {
                warn!(mode, stage = "primary", error = %e, "Edit failed, retrying via create");
                self.fallback(provider, request).await
            }
            Err(e) => {
                warn!(mode, stage = "placeholder", error = %e, "Generation failed");
                GenerationOutcome::placeholder()
            }
        }
    }

    async fn fallback(
        &self,
        provider: &dyn ImageProvider,
        request: &GenerationRequest,
    ) -> GenerationOutcome {
        let prompt = variation_prompt(&request.prompt);
        match self.attempt(provider, &ProviderCall::Create { prompt: &prompt }).await {
            Ok(artifact) => {
                info!(mode = "edit", stage = "fallback", "Generation succeeded");
                GenerationOutcome {
                    artifact,
                    source: OutcomeSource::ProviderFallback,
                }
            }
            Err(e) => {
                warn!(mode = "edit", stage = "placeholder", error = %e, "Fallback failed");
                GenerationOutcome::placeholder()
            }
        }
    }

    /// One provider round: call, decode, fetch if the result is remote.
    async fn attempt(
        &self,
        provider: &dyn ImageProvider,
        call: &ProviderCall<'_>,
    ) -> Result<Artifact, GenerationError> {
        let timeout = self.settings.call_timeout;
        let raw = tokio::time::timeout(timeout, call.send(provider))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;

        let (shape, decoded) = decode_response(&raw)?;
        info!(
            endpoint = call.endpoint(),
            shape = shape.name(),
            response_bytes = raw.body().len(),
            "Decoded provider response"
        );

        match decoded {
            Decoded::Inline(bytes) => Ok(Artifact::Bytes(bytes)),
            Decoded::Remote(url) if !self.settings.fetch_remote => Ok(Artifact::Url(url)),
            Decoded::Remote(url) => {
                let timeout = self.settings.download_timeout;
                let bytes = tokio::time::timeout(timeout, provider.download(&url))
                    .await
                    .map_err(|_| {
                        GenerationError::DownloadFailed(format!("timed out after {timeout:?}"))
                    })??;
                if bytes.is_empty() {
                    return Err(GenerationError::DownloadFailed("empty body".into()));
                }
                info!(endpoint = call.endpoint(), bytes = bytes.len(), "Downloaded artifact");
                Ok(Artifact::Bytes(bytes))
            }
        }
    }
}
