use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("screenshot not found: {id}")]
    NotFound { id: String },

    #[error("subject {requester} does not own screenshot {id}")]
    Forbidden { id: String, requester: String },

    #[error("storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("metadata serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a forbidden error
    pub fn forbidden<S: Into<String>, R: Into<String>>(id: S, requester: R) -> Self {
        Self::Forbidden {
            id: id.into(),
            requester: requester.into(),
        }
    }

    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Whether a retry of the same operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Backend { .. } | Self::Io { .. } | Self::Serialization { .. }
        )
    }
}
