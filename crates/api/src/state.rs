use std::sync::Arc;

use neocart_identity::IdentitySdk;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Built once by startup and read-only afterwards. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: neocart_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Identity SDK; may be uninitialized when running without credentials.
    pub identity: Arc<IdentitySdk>,
}
