//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use neocart_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/firebase-login`.
#[derive(Debug, Deserialize)]
pub struct FirebaseLoginRequest {
    /// ID token obtained by the browser from the identity provider.
    pub token: String,
    /// Display picture chosen client-side; overrides the token's `picture`.
    #[serde(default)]
    pub dp_url: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SessionUser,
}

/// Public profile carried by an access token.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<AuthUser> for SessionUser {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            name: user.name,
            picture: user.picture,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/firebase-login
///
/// Verify a provider-issued ID token and exchange it for a NeoCart access token.
pub async fn firebase_login(
    State(state): State<AppState>,
    Json(input): Json<FirebaseLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let app = state.identity.app()?;

    if input.token.trim().is_empty() {
        return Err(CoreError::Validation("token must not be empty".into()).into());
    }

    let mut identity = app.verify_id_token(input.token.trim()).await?;
    if let Some(dp_url) = input.dp_url.filter(|u| !u.trim().is_empty()) {
        identity.picture = Some(dp_url);
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(&identity, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(
        uid = %identity.uid,
        provider = identity.sign_in_provider.as_deref().unwrap_or("unknown"),
        "Identity verified, access token issued"
    );

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: jwt.access_token_expiry_mins * 60,
        user: SessionUser {
            uid: identity.uid,
            email: identity.email,
            name: identity.name,
            picture: identity.picture,
        },
    }))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser) -> Json<DataResponse<SessionUser>> {
    Json(DataResponse { data: user.into() })
}
