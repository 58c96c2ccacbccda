use std::process::ExitCode;
use std::sync::Arc;

use neocart_core::credentials::{CredentialChain, CREDENTIALS_JSON_ENV};
use neocart_identity::IdentitySdk;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neocart_api::config::ServerConfig;
use neocart_api::router::build_app_router;
use neocart_api::startup::{self, StartupError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "neocart_api=debug,neocart_identity=debug,neocart_db=debug,tower_http=debug"
                        .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: NeoCart API stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = Arc::new(ServerConfig::from_env()?);
    tracing::info!(
        addr = %config.socket_addr(),
        dist = %config.frontend.dist_dir.display(),
        cors_enabled = config.cors_enabled,
        "Loaded server configuration"
    );

    // --- Identity, database, frontend build ---
    let credentials =
        CredentialChain::standard(CREDENTIALS_JSON_ENV, &config.identity.credentials_path);
    let identity = Arc::new(IdentitySdk::new());
    let state = startup::prepare(Arc::clone(&config), credentials, identity).await?;

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|error| StartupError::Bind { addr, error })?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
