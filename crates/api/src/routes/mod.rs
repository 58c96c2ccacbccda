pub mod auth;
pub mod frontend;
pub mod health;

use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                        liveness message (GET)
/// /health                  service health (GET)
///
/// /auth/firebase-login     ID token -> access token (POST, public)
/// /auth/me                 caller profile (GET, bearer access token)
///
/// /*                       JSON 404, never the frontend document
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .fallback(handlers::meta::api_not_found)
}
