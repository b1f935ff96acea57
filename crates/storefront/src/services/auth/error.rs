//! Authentication error types.

use bazaar_core::ValidationError;
use thiserror::Error;

use crate::commerce::CommerceError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form fields failed local validation.
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// The commerce API rejected the credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The commerce API rejected the registration.
    #[error("registration rejected: {0}")]
    RegistrationRejected(String),

    /// The token is not a decodable JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// None of the id claims were present.
    #[error("User ID not found in token")]
    MissingUserId,

    /// Commerce API failure unrelated to the credentials.
    #[error("commerce API error: {0}")]
    Commerce(#[from] CommerceError),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
