//! Startup orchestration.
//!
//! Brings the process from cold start to a ready [`AppState`]:
//!
//! 1. Resolve identity-provider credentials and initialize the identity SDK.
//! 2. Connect to the database and create the schema.
//! 3. Inspect the frontend build output.
//!
//! Steps 1 and 2 share one deadline. Every error returned from here is fatal
//! and must stop the process before a socket is bound.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use neocart_core::credentials::{CredentialChain, CredentialError};
use neocart_identity::{IdentityError, IdentitySdk};

use crate::config::{ConfigError, FrontendConfig, ServerConfig};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("No identity-provider credentials found (checked: {checked}) and IDENTITY_REQUIRED is set")]
    MissingCredentials { checked: String },

    #[error("Identity SDK initialization failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema creation failed: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("Startup did not complete within {0:?}")]
    Timeout(Duration),

    #[error("Failed to bind {addr}: {error}")]
    Bind {
        addr: SocketAddr,
        #[source]
        error: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Outcome of identity initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// The SDK holds an app built from the credential found at `source`.
    Initialized { source: String },
    /// No credential anywhere; identity-dependent endpoints answer 503.
    Degraded,
}

/// What was found in the frontend build directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontendStatus {
    pub assets_present: bool,
    pub index_present: bool,
}

/// Run every startup step and assemble the application state.
pub async fn prepare(
    config: Arc<ServerConfig>,
    credentials: CredentialChain,
    identity: Arc<IdentitySdk>,
) -> Result<AppState, StartupError> {
    let budget = Duration::from_secs(config.startup_timeout_secs);

    let pool = within_deadline(budget, async {
        initialize_identity(&credentials, &identity, config.identity.required).await?;

        let pool = neocart_db::create_pool(
            &config.database_url,
            config.database_max_connections,
            budget,
        )
        .await?;
        tracing::info!("Database connection pool created");

        neocart_db::create_schema(&pool).await?;
        tracing::info!("Database schema ready");

        Ok::<_, StartupError>(pool)
    })
    .await?;

    inspect_frontend_build(&config.frontend);

    Ok(AppState {
        pool,
        config,
        identity,
    })
}

/// Resolve credentials through `credentials` and initialize `sdk` with them.
///
/// - Malformed or unreadable credentials are fatal.
/// - No credentials at all is fatal when `required`, otherwise degraded.
/// - An already-initialized SDK is fatal.
pub async fn initialize_identity(
    credentials: &CredentialChain,
    sdk: &IdentitySdk,
    required: bool,
) -> Result<IdentityStatus, StartupError> {
    match credentials.resolve().await? {
        Some(resolved) => {
            sdk.initialize(resolved.key)?;
            tracing::info!(source = %resolved.source, "Identity credentials loaded");
            Ok(IdentityStatus::Initialized {
                source: resolved.source,
            })
        }
        None if required => Err(StartupError::MissingCredentials {
            checked: credentials.source_names().join(", "),
        }),
        None => {
            tracing::warn!(
                checked = %credentials.source_names().join(", "),
                "No identity-provider credentials found; identity-dependent endpoints will return 503"
            );
            Ok(IdentityStatus::Degraded)
        }
    }
}

/// Report and warn about missing frontend build output. Never fails.
pub fn inspect_frontend_build(frontend: &FrontendConfig) -> FrontendStatus {
    let status = FrontendStatus {
        assets_present: frontend.assets_dir().is_dir(),
        index_present: frontend.index_file().is_file(),
    };

    if !status.index_present {
        tracing::warn!(
            path = %frontend.index_file().display(),
            "Frontend root document not found; browser routes will return an error payload"
        );
    }
    if !status.assets_present {
        tracing::warn!(
            path = %frontend.assets_dir().display(),
            "Static asset directory not found; /assets requests will return 404"
        );
    }
    if status.index_present && status.assets_present {
        tracing::info!(dist = %frontend.dist_dir.display(), "Frontend build found");
    }
    status
}

/// Run `step` with an upper bound on its duration.
pub async fn within_deadline<T, F>(budget: Duration, step: F) -> Result<T, StartupError>
where
    F: Future<Output = Result<T, StartupError>>,
{
    tokio::time::timeout(budget, step)
        .await
        .map_err(|_| StartupError::Timeout(budget))?
}
