use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::generation::{GenerationMode, GenerationRequest, HistoryFilter, SourceImage};
use crate::models::generation::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the image itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Body limit layer for the generation route.
pub fn generation_body_limit(max_upload_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload limit".into())
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

async fn read_image(field: Field<'_>) -> Result<Option<SourceImage>, AppError> {
    let content_type = field
        .content_type()
        .map(str::to_owned)
        .or_else(|| {
            field
                .file_name()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_owned())
        })
        .unwrap_or_default();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    // Browsers send an empty part when no file was picked.
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(SourceImage {
        bytes: bytes.to_vec(),
        content_type,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Generations",
    operation_id = "createGeneration",
    summary = "Generate an image",
    description = "Generates an image from a prompt (`mode=create`) or by editing an uploaded image (`mode=edit`). Provider, storage and history failures degrade the result instead of failing the request: `source` tells whether the image came from the provider or is a placeholder, and `error` is set when the record could not be saved. That case answers 200, or 207 when `generation.partial_success_status` is enabled.",
    request_body(content_type = "multipart/form-data", description = "Fields `prompt` (3-300 characters), `mode` (`create` or `edit`, default `create`) and `image` (file, required for edit, max 20 MiB)"),
    responses(
        (status = 200, description = "Image generated", body = GenerationResponse),
        (status = 207, description = "Image generated but not saved to history", body = GenerationResponse),
        (status = 400, description = "Invalid input (VALIDATION_ERROR, INVALID_PROMPT, MISSING_IMAGE, UNPROCESSABLE_IMAGE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(username = %auth_user.username, mode))]
pub async fn create_generation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut prompt = String::new();
    let mut mode = GenerationMode::Create;
    let mut source_image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("prompt") => prompt = read_text(field).await?,
            Some("mode") => {
                let raw = read_text(field).await?;
                mode = GenerationMode::parse(&raw).ok_or_else(|| {
                    AppError::Validation("mode must be one of: create, edit".into())
                })?;
            }
            Some("image") => source_image = read_image(field).await?,
            _ => {}
        }
    }
    tracing::Span::current().record("mode", mode.as_str());

    let report = state
        .orchestrator
        .handle(GenerationRequest {
            prompt,
            mode,
            source_image,
            requesting_user: auth_user.username,
        })
        .await?;

    let status = if !report.is_recorded() && state.config.generation.partial_success_status {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    Ok((status, Json(GenerationResponse::from(report))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Generations",
    operation_id = "listGenerations",
    summary = "List generation history",
    description = "Returns past generations, newest first. Filters combine: case-insensitive prompt substring, inclusive creation-time bounds and username.",
    params(GenerationListQuery),
    responses(
        (status = 200, description = "Generation history", body = GenerationListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_generations(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<GenerationListQuery>,
) -> Result<Json<GenerationListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let created_from = query
        .from
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, Bound::Start, "from"))
        .transpose()?;
    let created_to = query
        .to
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, Bound::End, "to"))
        .transpose()?;
    if let (Some(from), Some(to)) = (created_from, created_to)
        && from > to
    {
        return Err(AppError::Validation("from must not be after to".into()));
    }

    let filter = HistoryFilter {
        prompt_contains: query.prompt,
        created_from,
        created_to,
        user: query.user.filter(|u| !u.trim().is_empty()),
    };

    let result = state
        .history
        .query(&filter, page, per_page)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(GenerationListResponse {
        data: result.rows.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, result.total),
    }))
}
