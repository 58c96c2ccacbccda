//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- the caller behind a NeoCart access token.

pub mod auth;
