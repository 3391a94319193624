use thiserror::Error;

use snap_auth::AuthError;
use snap_store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// The error surface callers of the service core see.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The presented credential was missing, malformed, forged or expired.
    /// Which of those it was is not observable from outside.
    #[error("not authenticated")]
    Unauthenticated,

    #[error("screenshot not found: {id}")]
    NotFound { id: String },

    #[error("forbidden")]
    Forbidden,

    #[error("storage failure: {message}")]
    Storage { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ServiceError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP-ish status code for the facade to map onto its wire format
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound { .. } => 404,
            Self::Storage { .. } | Self::Config { .. } => 500,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            // Malformed, bad-signature and expired tokens all collapse to
            // the same variant so a caller cannot tell which check failed.
            AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Expired { .. } => Self::Unauthenticated,
            AuthError::Config { message } => Self::Config { message },
            AuthError::Hash { source } => Self::Storage {
                message: source.to_string(),
            },
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            StoreError::Forbidden { .. } => Self::Forbidden,
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}
