use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::generation::PipelineError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_PROMPT`,
    /// `MISSING_IMAGE`, `UNPROCESSABLE_IMAGE`, `PAYLOAD_TOO_LARGE`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `INTERNAL_ERROR`.
    #[schema(example = "INVALID_PROMPT")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Prompt must be 3-300 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidPrompt(String),
    MissingImage,
    UnprocessableImage(String),
    PayloadTooLarge(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidPrompt(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_PROMPT",
                    message: msg,
                },
            ),
            AppError::MissingImage => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "MISSING_IMAGE",
                    message: "Edit mode requires an image".into(),
                },
            ),
            AppError::UnprocessableImage(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNPROCESSABLE_IMAGE",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidPrompt(msg) => AppError::InvalidPrompt(msg),
            PipelineError::MissingImage => AppError::MissingImage,
            PipelineError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            PipelineError::UnprocessableImage(msg) => AppError::UnprocessableImage(msg),
        }
    }
}
