use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use neocart_core::error::CoreError;
use neocart_identity::IdentityError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{"error": ..., "code": ...}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `neocart_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Identity SDK failure (not initialized, bad token, key fetch).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The frontend build output is missing its root document.
    #[error("Frontend build missing: {0}")]
    FrontendBuildMissing(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Identity errors ---
            AppError::Identity(err) => classify_identity_error(err),

            AppError::FrontendBuildMissing(msg) => {
                tracing::error!(error = %msg, "Frontend build missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FRONTEND_BUILD_MISSING",
                    msg.clone(),
                )
            }
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map identity failures to HTTP.
///
/// - Missing SDK maps to 503: the server runs degraded, the request is fine.
/// - Token problems map to 401 without echoing the verifier's reason.
/// - Signing-key fetch failures map to 502.
fn classify_identity_error(err: &IdentityError) -> (StatusCode, &'static str, String) {
    match err {
        IdentityError::NotInitialized => (
            StatusCode::SERVICE_UNAVAILABLE,
            "IDENTITY_UNAVAILABLE",
            "Identity verification is not configured on this server".to_string(),
        ),
        IdentityError::InvalidToken(reason) => {
            tracing::debug!(reason = %reason, "Rejected ID token");
            (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired ID token".to_string(),
            )
        }
        IdentityError::KeyFetch(reason) => {
            tracing::error!(error = %reason, "Identity signing keys unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "IDENTITY_UPSTREAM",
                "Identity provider is unreachable".to_string(),
            )
        }
        other => internal(&other.to_string()),
    }
}
