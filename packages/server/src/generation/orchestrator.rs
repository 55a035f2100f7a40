use std::sync::Arc;

use atelier_common::{ArtifactStore, ImageNormalizer, NormalizedImage};
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::client::GenerationClient;
use super::error::PipelineError;
use super::history::{HistoryRepository, NewGeneration};
use super::{Artifact, GenerationMode, GenerationRequest, OutcomeSource, SourceImage};

pub const PROMPT_MIN_CHARS: usize = 3;
pub const PROMPT_MAX_CHARS: usize = 300;

/// Trim `prompt` and check its length in Unicode scalar values.
pub fn validate_prompt(prompt: &str) -> Result<&str, PipelineError> {
    let trimmed = prompt.trim();
    let len = trimmed.chars().count();
    if !(PROMPT_MIN_CHARS..=PROMPT_MAX_CHARS).contains(&len) {
        return Err(PipelineError::InvalidPrompt(format!(
            "Prompt must be {PROMPT_MIN_CHARS}-{PROMPT_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Result of one pipeline run.
///
/// `record_id` and `created_at` are absent when the history write failed; in
/// that case `advisory` says so and everything else is still valid.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub record_id: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub prompt: String,
    pub mode: GenerationMode,
    pub user: String,
    pub original_url: Option<String>,
    pub generated_url: String,
    pub source: OutcomeSource,
    pub advisory: Option<String>,
}

impl GenerationReport {
    pub fn is_recorded(&self) -> bool {
        self.advisory.is_none()
    }
}

/// Drives one request through validation, normalization, generation, upload
/// and history. Collaborators are built once at startup and shared.
#[derive(Clone)]
pub struct Orchestrator {
    normalizer: ImageNormalizer,
    client: GenerationClient,
    store: ArtifactStore,
    history: Arc<dyn HistoryRepository>,
}

impl Orchestrator {
    pub fn new(
        normalizer: ImageNormalizer,
        client: GenerationClient,
        store: ArtifactStore,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            normalizer,
            client,
            store,
            history,
        }
    }

    #[instrument(skip_all, fields(mode = request.mode.as_str(), user = %request.requesting_user))]
    pub async fn handle(&self, mut request: GenerationRequest) -> Result<GenerationReport, PipelineError> {
        let prompt = validate_prompt(&request.prompt)?.to_owned();

        let normalized = match request.mode {
            GenerationMode::Create => None,
            GenerationMode::Edit => {
                let source = request
                    .source_image
                    .take()
                    .filter(|img| !img.bytes.is_empty())
                    .ok_or(PipelineError::MissingImage)?;
                Some(self.normalize(source).await?)
            }
        };

        let original_url = match &normalized {
            Some(image) => Some(self.upload(image, "original").await),
            None => None,
        };

        let request = GenerationRequest { prompt, ..request };
        let outcome = self.client.generate(&request, normalized.as_ref()).await;

        let generated_url = match outcome.artifact {
            Artifact::Url(url) => url,
            Artifact::Bytes(bytes) => {
                self.store
                    .store(&bytes, &artifact_key("generated"))
                    .await
            }
        };

        let mut report = GenerationReport {
            record_id: None,
            created_at: None,
            prompt: request.prompt,
            mode: request.mode,
            user: request.requesting_user,
            original_url,
            generated_url,
            source: outcome.source,
            advisory: None,
        };

        let new = NewGeneration {
            prompt: report.prompt.clone(),
            original_url: report.original_url.clone(),
            generated_url: report.generated_url.clone(),
            user: report.user.clone(),
        };
        match self.history.insert(new).await {
            Ok(record) => {
                info!(id = record.id, source = ?report.source, "Generation recorded");
                report.record_id = Some(record.id);
                report.created_at = Some(record.created_at);
            }
            Err(e) => {
                error!(error = %e, "Failed to record generation");
                report.advisory = Some("Image generated but not saved to history".into());
            }
        }

        Ok(report)
    }

    /// Decoding and resampling are CPU-bound, so they run on the blocking pool.
    async fn normalize(&self, source: SourceImage) -> Result<NormalizedImage, PipelineError> {
        let normalizer = self.normalizer.clone();
        let normalized = tokio::task::spawn_blocking(move || {
            normalizer.normalize(&source.bytes, &source.content_type)
        })
        .await
        .map_err(|e| PipelineError::UnprocessableImage(format!("normalization task failed: {e}")))??;
        Ok(normalized)
    }

    async fn upload(&self, image: &NormalizedImage, prefix: &str) -> String {
        self.store.store(&image.bytes, &artifact_key(prefix)).await
    }
}

fn artifact_key(prefix: &str) -> String {
    format!("{prefix}/{}.png", Uuid::now_v7())
}
