use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{instrument, warn};

use crate::models::health::HealthResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Health check",
    description = "Pings the database. Answers 503 when it is unreachable.",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                timestamp: Utc::now(),
                uptime_secs: Some(state.started_at.elapsed().as_secs()),
                error: None,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    timestamp: Utc::now(),
                    uptime_secs: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
