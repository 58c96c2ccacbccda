//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/api/auth`.
///
/// ```text
/// POST /firebase-login  -> firebase_login
/// GET  /me              -> me (requires bearer access token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/firebase-login", post(auth::firebase_login))
        .route("/me", get(auth::me))
}
