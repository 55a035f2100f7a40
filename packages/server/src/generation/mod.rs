//! The generation pipeline: validation, normalization, provider calls with
//! fallbacks, artifact storage and history recording.

mod client;
mod decode;
mod error;
mod history;
mod orchestrator;
mod provider;

use serde::{Deserialize, Serialize};

pub use client::{ClientSettings, GenerationClient, variation_prompt};
pub use decode::{Decoded, ResponseShape, decode_response};
pub use error::{GenerationError, PipelineError};
pub use history::{
    GenerationRecord, HistoryError, HistoryFilter, HistoryPage, HistoryRepository, NewGeneration,
    SeaOrmHistory,
};
pub use orchestrator::{
    GenerationReport, Orchestrator, PROMPT_MAX_CHARS, PROMPT_MIN_CHARS, validate_prompt,
};
pub use provider::{ImageProvider, OpenAiProvider, RawResponse};

/// Operating variant of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Text-to-image.
    Create,
    /// Edit an uploaded source image.
    Edit,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Create => "create",
            GenerationMode::Edit => "edit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Some(GenerationMode::Create),
            "edit" => Some(GenerationMode::Edit),
            _ => None,
        }
    }
}

/// An uploaded source image, as received.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// Declared MIME type of the upload.
    pub content_type: String,
}

/// Input of one pipeline run. Owned by the orchestrator for its duration.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub mode: GenerationMode,
    pub source_image: Option<SourceImage>,
    /// Identity of the caller, taken from the verified token.
    pub requesting_user: String,
}

/// A generated artifact, either as raw bytes or as a URL already hosted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Bytes(Vec<u8>),
    Url(String),
}

/// Where the generated artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    /// The first provider call for the requested mode.
    ProviderPrimary,
    /// The create endpoint, after the edit endpoint failed.
    ProviderFallback,
    /// Synthesized locally because no provider call succeeded.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub artifact: Artifact,
    pub source: OutcomeSource,
}

impl GenerationOutcome {
    pub fn placeholder() -> Self {
        Self {
            artifact: Artifact::Bytes(Vec::new()),
            source: OutcomeSource::Placeholder,
        }
    }
}
