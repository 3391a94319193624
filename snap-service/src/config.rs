// Process configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use snap_auth::{SigningAlgorithm, SigningOptions};
use snap_store::ReadPolicy;

use crate::error::{ServiceError, ServiceResult};

/// Where screenshot content and metadata are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// In-memory, for development and tests
    Memory,
    /// On-disk under the given root directory
    Filesystem { root: PathBuf },
}

/// Everything the service needs at startup.
///
/// Built once, never reloaded at runtime. Construction does not validate;
/// [`ServiceOptions::validate`] (or service construction) does, and a
/// failure there is fatal.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub signing: SigningOptions,
    pub storage: StorageLocation,
    pub read_policy: ReadPolicy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            signing: SigningOptions::default(),
            storage: StorageLocation::Memory,
            read_policy: ReadPolicy::default(),
        }
    }
}

impl ServiceOptions {
    pub fn new(signing: SigningOptions) -> Self {
        Self {
            signing,
            ..Self::default()
        }
    }

    /// Set the storage location
    pub fn with_storage(mut self, storage: StorageLocation) -> Self {
        self.storage = storage;
        self
    }

    /// Set the read policy
    pub fn with_read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// | Variable                 | Meaning                                       |
    /// |--------------------------|-----------------------------------------------|
    /// | `SNAP_SIGNING_SECRET`    | HMAC key material (required)                  |
    /// | `SNAP_SIGNING_ALGORITHM` | `HS256` (default), `HS384`, `HS512`           |
    /// | `SNAP_TOKEN_TIMEOUT`     | humantime duration, e.g. `30m` (default)      |
    /// | `SNAP_STORAGE_ROOT`      | directory for on-disk storage; unset = memory |
    /// | `SNAP_READ_POLICY`       | `capability-link` (default) or `require-token`|
    pub fn from_env() -> ServiceResult<Self> {
        let secret = env::var("SNAP_SIGNING_SECRET")
            .map_err(|_| ServiceError::config("Missing SNAP_SIGNING_SECRET"))?;

        let mut signing = SigningOptions::new(secret);

        if let Ok(raw) = env::var("SNAP_SIGNING_ALGORITHM") {
            signing.algorithm = SigningAlgorithm::parse(&raw).map_err(ServiceError::from)?;
        }

        if let Ok(raw) = env::var("SNAP_TOKEN_TIMEOUT") {
            let timeout: Duration = humantime::parse_duration(&raw).map_err(|e| {
                ServiceError::config(format!("Invalid SNAP_TOKEN_TIMEOUT '{}': {}", raw, e))
            })?;
            signing.token_timeout = timeout;
        }

        let storage = match env::var("SNAP_STORAGE_ROOT") {
            Ok(root) if !root.trim().is_empty() => StorageLocation::Filesystem {
                root: PathBuf::from(root),
            },
            _ => StorageLocation::Memory,
        };

        let read_policy = match env::var("SNAP_READ_POLICY") {
            Ok(raw) => ReadPolicy::parse(&raw).ok_or_else(|| {
                ServiceError::config(format!("Invalid SNAP_READ_POLICY '{}'", raw))
            })?,
            Err(_) => ReadPolicy::default(),
        };

        Ok(Self {
            signing,
            storage,
            read_policy,
        })
    }

    /// Validate the configuration; failures here must abort startup.
    pub fn validate(&self) -> ServiceResult<()> {
        self.signing.validate()?;
        Ok(())
    }
}
