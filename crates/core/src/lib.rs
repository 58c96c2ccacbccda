//! Domain types shared across the NeoCart backend crates.
//!
//! - [`error`] -- the domain-level error type.
//! - [`credentials`] -- service-account credential model and resolution chain.

pub mod credentials;
pub mod error;
