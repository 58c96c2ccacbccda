//! PostgreSQL access for the NeoCart backend.
//!
//! This crate only owns connection setup and schema creation; the schema
//! itself lives in `db/migrations` at the workspace root and is embedded at
//! compile time.

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
///
/// Fails if the first connection cannot be established within
/// `acquire_timeout`.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create every table that does not exist yet.
///
/// Safe to call on every start: already-applied migrations are skipped and
/// existing rows are never touched.
pub async fn create_schema(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::debug!(migrations = MIGRATOR.iter().count(), "Schema is up to date");
    Ok(())
}
