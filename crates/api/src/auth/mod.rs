//! Session tokens issued after the identity provider vouches for a caller.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.

pub mod jwt;
