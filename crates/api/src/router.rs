//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the exact same route
//! precedence and middleware stack.

use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::routing::any;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::meta::api_not_found;
use crate::routes;
use crate::state::AppState;

/// Build the full application [`Router`].
///
/// Route precedence:
///
/// 1. `/api/auth/*` and `/api/*` (unknown API paths get a JSON 404)
/// 2. `/assets/*` static files
/// 3. everything else: the frontend root document
///
/// The middleware stack is applied bottom-up:
///
/// 1. CORS (when enabled)
/// 2. Set request ID on incoming requests
/// 3. Structured request/response tracing
/// 4. Propagate request ID to response
/// 5. Request timeout
/// 6. Panic recovery (catch panics, return 500)
pub fn build_app_router(state: AppState) -> Router {
    let config = std::sync::Arc::clone(&state.config);
    let request_id_header = HeaderName::from_static("x-request-id");

    // `nest` covers `/api` and `/api/{rest}` but not the bare trailing slash.
    let router = Router::new()
        .nest("/api", routes::api_routes())
        .route("/api/", any(api_not_found));
    let router = routes::frontend::attach(router, &config.frontend)
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid));

    let router = if config.cors_enabled {
        router.layer(build_cors_layer())
    } else {
        router
    };

    router.with_state(state)
}

/// Build the permissive CORS layer.
///
/// Any origin is accepted with credentials. A literal `*` cannot be combined
/// with credentials, so origin, methods and headers are mirrored from the
/// request instead.
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
