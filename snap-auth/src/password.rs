// Password hashing for the login collaborator.

use crate::error::AuthResult;

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hash a plain-text password with bcrypt.
pub fn hash_password(plain: &str, cost: u32) -> AuthResult<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Verify a plain-text password against a stored bcrypt hash.
pub fn verify_password(plain: &str, hashed: &str) -> AuthResult<bool> {
    Ok(bcrypt::verify(plain, hashed)?)
}
