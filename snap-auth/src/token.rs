// Token issue and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::options::SigningOptions;
use crate::subject::Subject;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// A freshly minted token together with its validity window.
///
/// Callers treat `token` as opaque bytes; the timestamps exist so a response
/// envelope can report when the credential stops working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    }
}

/// Mints signed, time-bounded tokens for an authenticated subject.
///
/// Stateless: issuing the same subject twice yields two independent tokens,
/// each valid until its own expiry.
pub struct TokenIssuer {
    options: SigningOptions,
    key: EncodingKey,
}

impl TokenIssuer {
    /// Create an issuer from validated options.
    ///
    /// Fails with a configuration error if the signing material is unusable;
    /// callers are expected to treat that as fatal at startup.
    pub fn new(options: SigningOptions) -> AuthResult<Self> {
        options.validate()?;
        let key = EncodingKey::from_secret(options.secret.as_bytes());
        Ok(Self { options, key })
    }

    /// Issue a token for `subject` as of `now`.
    pub fn issue(&self, subject: &Subject, now: DateTime<Utc>) -> AuthResult<SignedToken> {
        let issued_at = now;
        let timeout = Duration::seconds(self.options.token_timeout.as_secs() as i64);
        let expires_at = issued_at
            .checked_add_signed(timeout)
            .ok_or_else(|| AuthError::config("Token timeout overflows the expiry timestamp"))?;

        let claims = Claims {
            sub: subject.as_str().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(self.options.algorithm.into());
        let token = encode(&header, &claims, &self.key).map_err(map_jwt_error)?;

        Ok(SignedToken {
            token,
            issued_at,
            expires_at,
        })
    }
}

/// Verifies a token's signature and expiry, recovering the embedded subject.
pub struct TokenValidator {
    validation: Validation,
    key: DecodingKey,
}

impl TokenValidator {
    /// Create a validator from validated options.
    pub fn new(options: SigningOptions) -> AuthResult<Self> {
        options.validate()?;

        // Expiry is checked against the clock the caller passes in, not the
        // system clock, so the library-side exp check is disabled.
        let mut validation = Validation::new(options.algorithm.into());
        validation.validate_exp = false;
        validation.leeway = 0;

        let key = DecodingKey::from_secret(options.secret.as_bytes());
        Ok(Self { validation, key })
    }

    /// Validate `token` as of `now` and return the subject it asserts.
    ///
    /// The signature is verified before any claim is trusted. The expiry
    /// boundary is exclusive: a token is already expired at exactly
    /// `expires_at`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Subject> {
        let decoded =
            decode::<Claims>(token, &self.key, &self.validation).map_err(map_jwt_error)?;

        let claims = decoded.claims;
        if now.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0)
                .ok_or(AuthError::Malformed)?;
            return Err(AuthError::Expired { expired_at });
        }

        Ok(Subject::new(claims.sub))
    }
}
