pub mod auth;
pub mod frontend;
pub mod meta;
