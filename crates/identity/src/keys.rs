//! Sources of the public keys that sign ID tokens.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::IdentityError;

/// Google's published JWK set for Firebase ID tokens.
pub const GOOGLE_SECURE_TOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// How long a fetched key set is reused before fetching again.
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Upper bound on a single key-set fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Provides the current set of token signing keys.
#[async_trait::async_trait]
pub trait KeySource: Send + Sync {
    async fn keys(&self) -> Result<Arc<JwkSet>, IdentityError>;
}

struct CachedKeys {
    fetched_at: Instant,
    keys: Arc<JwkSet>,
}

/// Fetches keys over HTTPS and caches them for [`KEY_CACHE_TTL`].
pub struct GoogleKeySource {
    client: reqwest::Client,
    url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleKeySource {
    pub fn new() -> Self {
        Self::with_url(GOOGLE_SECURE_TOKEN_JWKS_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: url.into(),
            cache: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, IdentityError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))
    }
}

impl Default for GoogleKeySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KeySource for GoogleKeySource {
    async fn keys(&self) -> Result<Arc<JwkSet>, IdentityError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < KEY_CACHE_TTL {
                return Ok(Arc::clone(&cached.keys));
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < KEY_CACHE_TTL {
                return Ok(Arc::clone(&cached.keys));
            }
        }

        let keys = Arc::new(self.fetch().await?);
        tracing::debug!(url = %self.url, count = keys.keys.len(), "Fetched identity signing keys");
        *cache = Some(CachedKeys {
            fetched_at: Instant::now(),
            keys: Arc::clone(&keys),
        });
        Ok(keys)
    }
}

/// A fixed key set. Used by tests and offline deployments.
pub struct StaticKeySource {
    keys: Arc<JwkSet>,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn empty() -> Self {
        Self::new(JwkSet { keys: Vec::new() })
    }
}

#[async_trait::async_trait]
impl KeySource for StaticKeySource {
    async fn keys(&self) -> Result<Arc<JwkSet>, IdentityError> {
        Ok(Arc::clone(&self.keys))
    }
}
