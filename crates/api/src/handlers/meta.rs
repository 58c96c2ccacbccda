//! Service-level handlers: liveness message, health, unmatched API paths.

use axum::extract::{OriginalUri, State};
use axum::Json;
use neocart_core::error::CoreError;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is available, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether ID tokens can be verified.
    pub identity_initialized: bool,
}

/// GET /api
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the NeoCart API" }))
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = neocart_db::health_check(&state.pool).await.is_ok();
    let identity_initialized = state.identity.is_initialized();

    let status = if db_healthy && identity_initialized {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        identity_initialized,
    })
}

/// Fallback for `/api/*` paths no API route matched.
///
/// Keeps unknown API paths from ever reaching the frontend fallback.
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    CoreError::NotFound(format!("No API route for {}", uri.path())).into()
}
