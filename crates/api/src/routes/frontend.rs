//! Static assets and the single-page-application fallback.

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::FrontendConfig;
use crate::handlers::frontend;
use crate::state::AppState;

/// Attach frontend serving to `router`.
///
/// Must be applied after every API route is registered: the fallback matches
/// any remaining path, nested ones included. A missing build is reported once
/// at startup by [`crate::startup::inspect_frontend_build`].
///
/// ```text
/// /assets/*   files from <dist>/assets (404 when missing)
/// /*          <dist>/index.html (GET/HEAD only)
/// ```
pub fn attach(router: Router<AppState>, frontend: &FrontendConfig) -> Router<AppState> {
    router
        .nest_service("/assets", ServeDir::new(frontend.assets_dir()))
        .fallback(get(frontend::serve_index))
}
