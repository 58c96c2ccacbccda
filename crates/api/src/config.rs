use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Location of the prebuilt single-page-application bundle.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Build output directory (default: `dist`).
    pub dist_dir: PathBuf,
}

impl FrontendConfig {
    /// Directory served under `/assets`.
    pub fn assets_dir(&self) -> PathBuf {
        self.dist_dir.join("assets")
    }

    /// Document returned for every unmatched browser route.
    pub fn index_file(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}

/// Where identity-provider credentials are looked up.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Fallback key file, relative to the working directory.
    pub credentials_path: PathBuf,
    /// Refuse to start when no credentials are found anywhere.
    pub required: bool,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// PostgreSQL connection string (required).
    pub database_url: String,
    /// Maximum pooled connections (default: `10`).
    pub database_max_connections: u32,
    /// Whether the permissive cross-origin policy is installed (default: `true`).
    pub cors_enabled: bool,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bound on the whole startup sequence in seconds (default: `30`).
    pub startup_timeout_secs: u64,
    pub frontend: FrontendConfig,
    pub identity: IdentityConfig,
    /// Signing settings for the access tokens issued at login.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                     | Default                  |
    /// |-----------------------------|--------------------------|
    /// | `HOST`                      | `0.0.0.0`                |
    /// | `PORT`                      | `8000`                   |
    /// | `DATABASE_URL`              | **required**             |
    /// | `DATABASE_MAX_CONNECTIONS`  | `10`                     |
    /// | `CORS_ENABLED`              | `true`                   |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                     |
    /// | `STARTUP_TIMEOUT_SECS`      | `30`                     |
    /// | `FRONTEND_DIST_DIR`         | `dist`                   |
    /// | `FIREBASE_CREDENTIALS_PATH` | `serviceAccountKey.json` |
    /// | `IDENTITY_REQUIRED`         | `false`                  |
    /// | `JWT_SECRET`                | **required**             |
    /// | `JWT_ACCESS_EXPIRY_MINS`    | `60`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            host: parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&lookup, "PORT", 8000)?,
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            cors_enabled: flag_or(&lookup, "CORS_ENABLED", true)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            startup_timeout_secs: parse_or(&lookup, "STARTUP_TIMEOUT_SECS", 30)?,
            frontend: FrontendConfig {
                dist_dir: lookup("FRONTEND_DIST_DIR")
                    .unwrap_or_else(|| "dist".into())
                    .into(),
            },
            identity: IdentityConfig {
                credentials_path: lookup("FIREBASE_CREDENTIALS_PATH")
                    .unwrap_or_else(|| "serviceAccountKey.json".into())
                    .into(),
                required: flag_or(&lookup, "IDENTITY_REQUIRED", false)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry_mins: parse_or(
                    &lookup,
                    "JWT_ACCESS_EXPIRY_MINS",
                    DEFAULT_ACCESS_EXPIRY_MINS,
                )?,
            },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn flag_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a boolean".into(),
        }),
    }
}
