//! Liveness and readiness probes

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Liveness answer: the process is up
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Crate version of the running server
    pub version: String,
}

/// Readiness answer: the catalog database answered a query
#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Liveness probe. Never touches the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// Readiness probe. Fails with 500 when the catalog database cannot be queried.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Catalog database reachable", body = ReadinessResponse),
        (status = 500, description = "Catalog database unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<ReadinessResponse>> {
    state.services.repository.ping().await?;
    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        version: VERSION.to_string(),
        database: "ok".to_string(),
    }))
}
