use std::time::Duration;

use atelier_common::ImageError;
use thiserror::Error;

/// Provider-side failures. All of them are recovered by the fallback ladder.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider credentials are not configured")]
    ProviderUnavailable,

    #[error("provider call failed ({status}): {message}")]
    ProviderCallFailed { status: u16, message: String },

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider response matched no known shape")]
    UnsupportedProviderResponse,

    #[error("artifact download failed: {0}")]
    DownloadFailed(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal, caller-facing failures of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidPrompt(String),

    #[error("edit mode requires a source image")]
    MissingImage,

    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    PayloadTooLarge { actual: usize, limit: usize },

    #[error("unprocessable image: {0}")]
    UnprocessableImage(String),
}

impl From<ImageError> for PipelineError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::PayloadTooLarge { actual, limit } => {
                PipelineError::PayloadTooLarge { actual, limit }
            }
            ImageError::Unprocessable(msg) => PipelineError::UnprocessableImage(msg),
        }
    }
}
