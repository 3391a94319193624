use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for credential operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while issuing or validating tokens.
///
/// `Malformed`, `InvalidSignature` and `Expired` are distinguished here so
/// tests and logs can tell them apart; the service layer collapses all three
/// into a single unauthenticated error before anything reaches a caller.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token could not be parsed")]
    Malformed,

    #[error("token signature did not verify")]
    InvalidSignature,

    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("invalid signing configuration: {message}")]
    Config { message: String },

    #[error("password hashing failed: {source}")]
    Hash {
        #[from]
        source: bcrypt::BcryptError,
    },
}

impl AuthError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this failure means the presented token is not trustworthy.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::Malformed | Self::InvalidSignature | Self::Expired { .. }
        )
    }
}
