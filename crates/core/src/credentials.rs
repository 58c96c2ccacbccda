//! Service-account credentials and the ordered chain that resolves them.
//!
//! A [`CredentialChain`] holds a list of [`CredentialProvider`]s that are tried
//! in order. The first provider that yields a credential wins. A provider that
//! finds nothing returns `Ok(None)` and the chain moves on; a provider that
//! finds something unusable returns `Err` and the chain stops.

use std::env::VarError;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The only `type` value accepted in a service-account key document.
pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Environment variable holding an inline JSON service-account key.
pub const CREDENTIALS_JSON_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";

/// Errors raised while resolving credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The source exists but its content is not a usable service-account key.
    #[error("Malformed credentials from {source_name}: {reason}")]
    Malformed {
        source_name: String,
        reason: String,
    },

    /// The credential file exists but could not be read.
    #[error("Failed to read credential file {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// A Google service-account JSON key.
///
/// Unknown fields are ignored so newer key formats still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Parse and validate a key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let key: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        key.validate()?;
        Ok(key)
    }

    /// Check the fields the identity provider relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(format!(
                "expected type '{SERVICE_ACCOUNT_TYPE}', got '{}'",
                self.key_type
            ));
        }
        for (field, value) in [
            ("project_id", &self.project_id),
            ("private_key", &self.private_key),
            ("client_email", &self.client_email),
        ] {
            if value.trim().is_empty() {
                return Err(format!("field '{field}' must not be empty"));
            }
        }
        Ok(())
    }
}

/// A credential found by the chain, tagged with the provider that produced it.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub key: ServiceAccountKey,
    pub source: String,
}

/// A single place credentials may come from.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Human-readable source name used in logs and errors.
    fn name(&self) -> String;

    /// Look for a credential. `Ok(None)` means "not configured here".
    async fn resolve(&self) -> Result<Option<ServiceAccountKey>, CredentialError>;
}

/// Reads an inline JSON key from an environment variable.
///
/// An unset or blank variable counts as absent. A value that is not UTF-8
/// is malformed.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> String {
        format!("env:{}", self.var)
    }

    async fn resolve(&self) -> Result<Option<ServiceAccountKey>, CredentialError> {
        let raw = match std::env::var(&self.var) {
            Ok(raw) => raw,
            Err(VarError::NotPresent) => return Ok(None),
            Err(VarError::NotUnicode(_)) => {
                return Err(CredentialError::Malformed {
                    source_name: self.name(),
                    reason: "value is not valid UTF-8".into(),
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        ServiceAccountKey::from_json(&raw)
            .map(Some)
            .map_err(|reason| CredentialError::Malformed {
                source_name: self.name(),
                reason,
            })
    }
}

/// Reads a JSON key file. A missing file counts as absent.
pub struct FileCredentialProvider {
    path: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for FileCredentialProvider {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn resolve(&self) -> Result<Option<ServiceAccountKey>, CredentialError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(CredentialError::Io {
                    path: self.path.clone(),
                    error,
                })
            }
        };

        ServiceAccountKey::from_json(&raw)
            .map(Some)
            .map_err(|reason| CredentialError::Malformed {
                source_name: self.name(),
                reason,
            })
    }
}

/// Returns a fixed answer. Used to inject credentials in tests.
pub struct StaticCredentialProvider {
    key: Option<ServiceAccountKey>,
}

impl StaticCredentialProvider {
    pub fn new(key: Option<ServiceAccountKey>) -> Self {
        Self { key }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for StaticCredentialProvider {
    fn name(&self) -> String {
        "static".to_string()
    }

    async fn resolve(&self) -> Result<Option<ServiceAccountKey>, CredentialError> {
        Ok(self.key.clone())
    }
}

/// Ordered list of credential providers.
#[derive(Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The production order: inline JSON env var first, then the key file.
    pub fn standard(env_var: &str, file_path: impl Into<PathBuf>) -> Self {
        Self::new()
            .with(EnvCredentialProvider::new(env_var))
            .with(FileCredentialProvider::new(file_path))
    }

    /// Append a provider to the end of the chain.
    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order.
    ///
    /// Returns the first credential found, `Ok(None)` when every provider
    /// came up empty, or the first error encountered.
    pub async fn resolve(&self) -> Result<Option<ResolvedCredential>, CredentialError> {
        for provider in &self.providers {
            if let Some(key) = provider.resolve().await? {
                return Ok(Some(ResolvedCredential {
                    key,
                    source: provider.name(),
                }));
            }
        }
        Ok(None)
    }
}
