//! Single-page-application fallback.

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /{any path not matched elsewhere}
///
/// Returns the frontend root document so client-side routing can take over.
/// The document is read on every request so a redeployed build is picked up
/// without a restart.
pub async fn serve_index(State(state): State<AppState>) -> AppResult<Response> {
    let path = state.config.frontend.index_file();

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok((
            [
                (CONTENT_TYPE, "text/html; charset=utf-8"),
                (CACHE_CONTROL, "no-cache"),
            ],
            bytes,
        )
            .into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::FrontendBuildMissing(format!(
                "index.html not found at '{}'. Build the frontend and place its 'dist' \
                 output where FRONTEND_DIST_DIR points.",
                path.display()
            )))
        }
        Err(e) => Err(AppError::InternalError(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}
