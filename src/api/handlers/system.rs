//! System endpoints: health check, upload limits.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::ingest::validator::{ALLOWED_CONTENT_TYPES, ALLOWED_EXTENSIONS};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Upload constraints a client should apply before sending a file.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadLimitsResponse {
    max_upload_bytes: u64,
    recommended_max_bytes: u64,
    extensions: Vec<&'static str>,
    content_types: Vec<&'static str>,
}

/// `GET /config/upload-limits`: Accepted file types and sizes.
#[utoipa::path(
    get,
    path = "/config/upload-limits",
    tag = "System",
    summary = "Upload limits",
    description = "Server ceiling and the smaller size clients are advised to enforce, plus the accepted extensions and MIME types.",
    responses(
        (status = 200, description = "Upload limits", body = UploadLimitsResponse),
    )
)]
pub async fn upload_limits_handler(State(state): State<AppState>) -> impl IntoResponse {
    let limits = state.entry_service.limits();
    Json(UploadLimitsResponse {
        max_upload_bytes: limits.max_bytes,
        recommended_max_bytes: limits.client_hint_bytes,
        extensions: ALLOWED_EXTENSIONS.to_vec(),
        content_types: ALLOWED_CONTENT_TYPES.to_vec(),
    })
}

/// System routes mounted at the root level (not under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/upload-limits", get(upload_limits_handler))
}
