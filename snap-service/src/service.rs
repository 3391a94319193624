// The service core: authenticated screenshot operations.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use snap_auth::{SignedToken, Subject, TokenIssuer, TokenValidator};
use snap_store::{
    authorize, AccessDecision, FsStore, MemoryStore, Operation, ReadPolicy, Screenshot,
    ScreenshotId, ScreenshotMeta, ScreenshotStore, StoreResult,
};

use crate::config::{ServiceOptions, StorageLocation};
use crate::error::{ServiceError, ServiceResult};

/// Response envelope for a freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SignedToken> for IssuedToken {
    fn from(signed: SignedToken) -> Self {
        Self {
            access_token: signed.token,
            token_type: "bearer".to_string(),
            expires_at: signed.expires_at,
        }
    }
}

/// Ties the issuer, validator, store and access policy together into the
/// operations the facade exposes.
///
/// Every operation takes `now` explicitly; expiry is always judged against
/// the clock of the process answering the request.
pub struct ScreenshotService {
    issuer: TokenIssuer,
    validator: TokenValidator,
    store: Arc<dyn ScreenshotStore>,
    read_policy: ReadPolicy,
}

impl ScreenshotService {
    /// Build a service over an existing store.
    ///
    /// Fails with a configuration error if the signing material is
    /// unusable; callers treat that as fatal at startup.
    pub fn new(options: ServiceOptions, store: Arc<dyn ScreenshotStore>) -> ServiceResult<Self> {
        options.validate()?;
        Ok(Self {
            issuer: TokenIssuer::new(options.signing.clone())?,
            validator: TokenValidator::new(options.signing)?,
            store,
            read_policy: options.read_policy,
        })
    }

    /// Build a service and its store from startup options.
    pub async fn from_options(options: ServiceOptions) -> ServiceResult<Self> {
        let store: Arc<dyn ScreenshotStore> = match &options.storage {
            StorageLocation::Memory => Arc::new(MemoryStore::new()),
            StorageLocation::Filesystem { root } => Arc::new(FsStore::open(root.clone()).await?),
        };
        Self::new(options, store)
    }

    /// Issue a token for an already-authenticated subject.
    pub fn issue_token(
        &self,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> ServiceResult<IssuedToken> {
        let signed = self.issuer.issue(subject, now)?;
        tracing::info!(subject = %subject, expires_at = %signed.expires_at, "issued token");
        Ok(signed.into())
    }

    /// Validate a bearer token, collapsing every failure mode into
    /// `Unauthenticated`.
    fn authenticate(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<Subject> {
        self.validator.validate(token, now).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            ServiceError::from(e)
        })
    }

    /// Store a screenshot for the token's subject and return its id.
    pub async fn upload(
        &self,
        token: &str,
        content: Bytes,
        content_type: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ScreenshotId> {
        let subject = self.authenticate(token, now)?;
        let id = self.store.put(content, content_type, &subject).await?;
        Ok(id)
    }

    /// Fetch a screenshot by id.
    ///
    /// Under `ReadPolicy::CapabilityLink` no token is needed; a token that
    /// is presented anyway still has to verify. Under `RequireToken` the
    /// read is refused without one.
    pub async fn fetch(
        &self,
        token: Option<&str>,
        id: &ScreenshotId,
        now: DateTime<Utc>,
    ) -> ServiceResult<Screenshot> {
        let subject = match token {
            Some(t) => Some(self.authenticate(t, now)?),
            None => None,
        };

        // Without a token and without an anonymous-read policy, storage is
        // never touched at all.
        if self.read_policy == ReadPolicy::RequireToken && subject.is_none() {
            return Err(ServiceError::Unauthenticated);
        }

        let screenshot = self
            .retry_read(|| self.store.get(id))
            .await
            .map_err(ServiceError::from)?;

        let decision = authorize(
            subject.as_ref(),
            Operation::Read,
            &screenshot.meta.owner,
            self.read_policy,
        );
        match decision {
            AccessDecision::Allow => Ok(screenshot),
            AccessDecision::Deny(_) => Err(ServiceError::Unauthenticated),
        }
    }

    /// Delete a screenshot on behalf of the token's subject.
    pub async fn remove(
        &self,
        token: &str,
        id: &ScreenshotId,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let subject = self.authenticate(token, now)?;
        self.store.delete(id, &subject).await?;
        tracing::info!(id = %id, subject = %subject, "screenshot deleted");
        Ok(())
    }

    /// List the token's subject's most recent screenshots, newest first.
    pub async fn recent(
        &self,
        token: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<ScreenshotMeta>> {
        let subject = self.authenticate(token, now)?;
        let listing = self
            .retry_read(|| self.store.list_recent(&subject, limit))
            .await?;
        Ok(listing)
    }

    /// Run a read-only store operation, retrying once on a transient
    /// storage failure. Writes are never retried.
    async fn retry_read<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = StoreResult<T>>,
    {
        match op().await {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "read failed, retrying once");
                op().await
            }
            other => other,
        }
    }
}
