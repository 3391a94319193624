// Credential lifecycle: signing configuration, token issue/validate, password hashing.

pub mod error;
pub mod options;
pub mod password;
pub mod subject;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use options::{SigningAlgorithm, SigningOptions};
pub use password::{hash_password, verify_password, DEFAULT_BCRYPT_COST};
pub use subject::Subject;
pub use token::{SignedToken, TokenIssuer, TokenValidator};
