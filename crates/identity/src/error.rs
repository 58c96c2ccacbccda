/// Errors raised by the identity SDK.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The service-account key was rejected at initialization.
    #[error("Invalid service-account credential: {0}")]
    InvalidCredential(String),

    /// `initialize` was called on an SDK that already holds an app.
    #[error("Identity SDK is already initialized")]
    AlreadyInitialized,

    /// No credential was available at startup, so nothing can be verified.
    #[error("Identity SDK is not initialized")]
    NotInitialized,

    /// The ID token is malformed, expired, or fails signature/claim checks.
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// The provider's signing keys could not be fetched.
    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),
}
