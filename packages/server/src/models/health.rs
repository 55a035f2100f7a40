use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service and database liveness.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    #[schema(example = "healthy")]
    pub status: &'static str,
    /// `connected` or `disconnected`.
    #[schema(example = "connected")]
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started. Present when healthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 3600)]
    pub uptime_secs: Option<u64>,
    /// Database error. Present when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
