use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use snap_auth::Subject;

use crate::access::{self, AccessDecision, Operation, ReadPolicy};
use crate::store::ScreenshotStore;
use crate::{Screenshot, ScreenshotId, ScreenshotMeta, StoreError, StoreResult};

/// In-memory backend for testing and development
#[derive(Default)]
pub struct MemoryStore {
    /// Live screenshots indexed by id
    entries: Arc<RwLock<HashMap<ScreenshotId, Screenshot>>>,

    /// Ids of deleted screenshots; a deleted id is never reissued
    tombstones: Arc<RwLock<HashSet<ScreenshotId>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live screenshots
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ScreenshotStore for MemoryStore {
    async fn put(
        &self,
        content: Bytes,
        content_type: &str,
        owner: &Subject,
    ) -> StoreResult<ScreenshotId> {
        let mut entries = self.entries.write();
        let tombstones = self.tombstones.read();

        // Allocation happens under the write lock, so concurrent callers
        // never observe the same id. A regenerate loop guards the
        // (256-bit-random) collision case.
        let mut id = ScreenshotId::new();
        while entries.contains_key(&id) || tombstones.contains(&id) {
            id = ScreenshotId::new();
        }

        let meta = ScreenshotMeta {
            id: id.clone(),
            owner: owner.clone(),
            content_type: content_type.to_string(),
            size_bytes: content.len() as u64,
            created_at: Utc::now(),
        };

        entries.insert(id.clone(), Screenshot { meta, content });
        tracing::debug!(id = %id, owner = %owner, "stored screenshot");

        Ok(id)
    }

    async fn get(&self, id: &ScreenshotId) -> StoreResult<Screenshot> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id.as_str()))
    }

    async fn delete(&self, id: &ScreenshotId, requester: &Subject) -> StoreResult<()> {
        let mut entries = self.entries.write();

        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::not_found(id.as_str()))?;

        // Read policy is irrelevant for deletion; the decision only turns
        // on ownership.
        let decision = access::authorize(
            Some(requester),
            Operation::Delete,
            &entry.meta.owner,
            ReadPolicy::default(),
        );
        if let AccessDecision::Deny(_) = decision {
            return Err(StoreError::forbidden(id.as_str(), requester.as_str()));
        }

        entries.remove(id);
        self.tombstones.write().insert(id.clone());
        tracing::debug!(id = %id, requester = %requester, "deleted screenshot");

        Ok(())
    }

    async fn list_recent(
        &self,
        owner: &Subject,
        limit: usize,
    ) -> StoreResult<Vec<ScreenshotMeta>> {
        let entries = self.entries.read();

        let mut metas: Vec<ScreenshotMeta> = entries
            .values()
            .filter(|s| &s.meta.owner == owner)
            .map(|s| s.meta.clone())
            .collect();

        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        metas.truncate(limit);

        Ok(metas)
    }
}
