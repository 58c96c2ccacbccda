//! NeoCart API server library.
//!
//! Exposes configuration, startup orchestration, state, error handling and
//! router assembly so integration tests and the binary entrypoint share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod startup;
pub mod state;
