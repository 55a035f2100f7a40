use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::error::AppError;
use crate::generation::{GenerationMode, GenerationRecord, GenerationReport, OutcomeSource};

/// Default number of history rows per page.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

/// Result of a generation request.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerationResponse {
    /// History record ID. Null when the record could not be saved.
    #[schema(example = 17)]
    pub id: Option<i32>,
    /// Uploaded normalized source image (edit mode only).
    #[schema(example = "https://storage.googleapis.com/atelier/original/0190b3c2.png")]
    pub original_url: Option<String>,
    /// Generated image, or an inline placeholder `data:` URL.
    #[schema(example = "https://storage.googleapis.com/atelier/generated/0190b3c3.png")]
    pub generated_url: String,
    /// The prompt as used, trimmed.
    #[schema(example = "a red bicycle")]
    pub prompt: String,
    pub mode: GenerationMode,
    /// Username of the requester.
    #[schema(example = "alice")]
    pub user: String,
    /// Null when the record could not be saved.
    pub created_at: Option<DateTime<Utc>>,
    pub source: OutcomeSource,
    /// Advisory note, present when the image was generated but not saved to history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Image generated but not saved to history")]
    pub error: Option<String>,
}

impl From<GenerationReport> for GenerationResponse {
    fn from(r: GenerationReport) -> Self {
        Self {
            id: r.record_id,
            original_url: r.original_url,
            generated_url: r.generated_url,
            prompt: r.prompt,
            mode: r.mode,
            user: r.user,
            created_at: r.created_at,
            source: r.source,
            error: r.advisory,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct GenerationListQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 6).
    #[param(example = 6)]
    pub page_size: Option<u64>,
    /// Case-insensitive substring of the prompt.
    #[param(example = "bicycle")]
    pub prompt: Option<String>,
    /// Earliest creation time, inclusive. RFC 3339 or `YYYY-MM-DD`.
    #[param(example = "2026-01-01")]
    pub from: Option<String>,
    /// Latest creation time, inclusive. RFC 3339 or `YYYY-MM-DD` (whole day).
    #[param(example = "2026-01-31T23:59:59Z")]
    pub to: Option<String>,
    /// Only rows created by this username.
    #[param(example = "alice")]
    pub user: Option<String>,
}

#[derive(Clone, Copy)]
pub enum Bound {
    Start,
    End,
}

/// Parse a date filter. A bare date covers the whole UTC day.
pub fn parse_bound(raw: &str, bound: Bound, field: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{field} must be an RFC 3339 timestamp or YYYY-MM-DD"))
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time).and_utc())
}

/// One history row.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerationListItem {
    #[schema(example = 17)]
    pub id: i32,
    #[schema(example = "a red bicycle")]
    pub prompt: String,
    pub original_url: Option<String>,
    pub generated_url: String,
    #[schema(example = "alice")]
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl From<GenerationRecord> for GenerationListItem {
    fn from(r: GenerationRecord) -> Self {
        Self {
            id: r.id,
            prompt: r.prompt,
            original_url: r.original_url,
            generated_url: r.generated_url,
            user: r.user,
            created_at: r.created_at,
        }
    }
}

/// Paginated history, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct GenerationListResponse {
    pub data: Vec<GenerationListItem>,
    pub pagination: Pagination,
}
