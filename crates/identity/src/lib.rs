//! Identity-provider SDK used to verify end-user ID tokens.
//!
//! - [`sdk::IdentitySdk`] -- once-only initialization from a service-account key.
//! - [`app::IdentityApp`] -- the initialized handle; verifies ID tokens.
//! - [`keys`] -- where token signing keys come from.

pub mod app;
pub mod error;
pub mod keys;
pub mod sdk;

pub use app::{IdentityApp, VerifiedIdentity};
pub use error::IdentityError;
pub use sdk::IdentitySdk;
