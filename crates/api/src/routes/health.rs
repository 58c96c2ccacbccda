use axum::routing::get;
use axum::Router;

use crate::handlers::meta;
use crate::state::AppState;

/// Liveness and health routes, merged into the `/api` tree.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(meta::welcome))
        .route("/health", get(meta::health_check))
}
