// Signing configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// HMAC signing algorithms for access tokens
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SigningAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl Default for SigningAlgorithm {
    fn default() -> Self {
        Self::HS256
    }
}

impl SigningAlgorithm {
    /// Parse from a configuration string ("HS256", "hs384", ...)
    pub fn parse(s: &str) -> AuthResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(AuthError::config(format!(
                "Unknown signing algorithm: '{}'",
                other
            ))),
        }
    }
}

impl From<SigningAlgorithm> for jsonwebtoken::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            SigningAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            SigningAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

/// Process-wide signing configuration.
///
/// Built once at startup and handed to [`crate::TokenIssuer`] and
/// [`crate::TokenValidator`]; issuer and validator must share the same
/// secret and algorithm or nothing will verify.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningOptions {
    /// Signing algorithm for issued tokens
    pub algorithm: SigningAlgorithm,
    /// HMAC key material
    pub secret: String,
    /// Duration added to `issued_at` to compute `expires_at`
    #[serde(with = "humantime_serde")]
    pub token_timeout: Duration,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::default(),
            secret: String::new(),
            token_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl SigningOptions {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Set the signing algorithm
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the token timeout
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }

    /// Validate the configuration.
    ///
    /// A failure here is a fatal startup condition: the process must refuse
    /// to serve traffic without usable signing material.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.trim().is_empty() {
            return Err(AuthError::config("Signing secret cannot be empty"));
        }

        if self.secret.len() < 16 {
            return Err(AuthError::config(
                "Signing secret must be at least 16 bytes",
            ));
        }

        if self.token_timeout.as_secs() == 0 {
            return Err(AuthError::config(
                "Token timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
