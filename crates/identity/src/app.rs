use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use neocart_core::credentials::ServiceAccountKey;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::keys::KeySource;

/// Issuer prefix for ID tokens; the project id is appended.
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Claims carried by a provider-issued ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    firebase: Option<FirebaseClaim>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaim {
    #[serde(default)]
    sign_in_provider: Option<String>,
}

/// The identity extracted from a verified ID token.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub phone_number: Option<String>,
    pub sign_in_provider: Option<String>,
}

/// An initialized identity-provider application.
///
/// Created only through [`crate::IdentitySdk::initialize`].
pub struct IdentityApp {
    credential: ServiceAccountKey,
    keys: Arc<dyn KeySource>,
}

impl std::fmt::Debug for IdentityApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The private key never appears in logs.
        f.debug_struct("IdentityApp")
            .field("project_id", &self.credential.project_id)
            .field("service_account", &self.credential.client_email)
            .finish_non_exhaustive()
    }
}

impl IdentityApp {
    pub(crate) fn new(credential: ServiceAccountKey, keys: Arc<dyn KeySource>) -> Self {
        Self { credential, keys }
    }

    pub fn project_id(&self) -> &str {
        &self.credential.project_id
    }

    pub fn service_account_email(&self) -> &str {
        &self.credential.client_email
    }

    /// Verify an ID token and return the identity it asserts.
    ///
    /// Checks, in order: header shape, signing key id, signature, expiry,
    /// audience (project id), issuer, and a non-empty subject.
    pub async fn verify_id_token(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header =
            decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "unexpected algorithm {:?}, expected RS256",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing 'kid' header".into()))?;

        let keys = self.keys.keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| IdentityError::InvalidToken(format!("unknown signing key '{kid}'")))?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| IdentityError::KeyFetch(format!("unusable signing key '{kid}': {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id()]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{}", self.project_id())]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let claims = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidToken("empty subject".into()));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            name: claims.name,
            picture: claims.picture,
            phone_number: claims.phone_number,
            sign_in_provider: claims.firebase.and_then(|f| f.sign_in_provider),
        })
    }
}
