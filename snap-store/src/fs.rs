use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::fs;

use snap_auth::Subject;

use crate::access::{self, AccessDecision, Operation, ReadPolicy};
use crate::store::ScreenshotStore;
use crate::{Screenshot, ScreenshotId, ScreenshotMeta, StoreError, StoreResult};

const CONTENT_DIR: &str = "content";
const META_DIR: &str = "meta";
const STAGING_DIR: &str = "staging";

/// Filesystem backend.
///
/// Content and metadata are written to a staging area first and moved into
/// place with `rename`; the metadata rename is the commit point, so a
/// screenshot is observable iff its metadata file exists. Leftovers from a
/// crash mid-write are swept away by [`FsStore::open`].
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory layout if
    /// needed and cleaning up any orphaned writes from a previous run.
    pub async fn open<P: Into<PathBuf>>(root: P) -> StoreResult<Self> {
        let root = root.into();

        for dir in [CONTENT_DIR, META_DIR, STAGING_DIR] {
            fs::create_dir_all(root.join(dir)).await?;
        }

        let store = Self { root };
        store.sweep_orphans().await?;
        Ok(store)
    }

    fn content_path(&self, id: &ScreenshotId) -> PathBuf {
        self.root.join(CONTENT_DIR).join(id.as_str())
    }

    fn meta_path(&self, id: &ScreenshotId) -> PathBuf {
        self.root.join(META_DIR).join(format!("{}.json", id))
    }

    fn staging_content_path(&self, id: &ScreenshotId) -> PathBuf {
        self.root.join(STAGING_DIR).join(format!("{}.content", id))
    }

    fn staging_meta_path(&self, id: &ScreenshotId) -> PathBuf {
        self.root.join(STAGING_DIR).join(format!("{}.json", id))
    }

    /// Remove staging leftovers and content files that never got a
    /// committed metadata row.
    async fn sweep_orphans(&self) -> StoreResult<()> {
        let staging = self.root.join(STAGING_DIR);
        let mut entries = fs::read_dir(&staging).await?;
        while let Some(entry) = entries.next_entry().await? {
            tracing::warn!(path = %entry.path().display(), "removing staged leftover");
            let _ = fs::remove_file(entry.path()).await;
        }

        let content = self.root.join(CONTENT_DIR);
        let mut entries = fs::read_dir(&content).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            let id = ScreenshotId::from_string(name);
            if !fs::try_exists(self.meta_path(&id)).await? {
                tracing::warn!(id = %id, "removing orphaned content");
                let _ = fs::remove_file(entry.path()).await;
            }
        }

        Ok(())
    }

    async fn read_meta(&self, id: &ScreenshotId) -> StoreResult<ScreenshotMeta> {
        let bytes = fs::read(self.meta_path(id))
            .await
            .map_err(|e| io_to_store(e, id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn io_to_store(err: std::io::Error, id: &ScreenshotId) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::not_found(id.as_str())
    } else {
        StoreError::from(err)
    }
}

async fn remove_if_present(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "cleanup failed");
        }
    }
}

#[async_trait]
impl ScreenshotStore for FsStore {
    async fn put(
        &self,
        content: Bytes,
        content_type: &str,
        owner: &Subject,
    ) -> StoreResult<ScreenshotId> {
        // Ids come from a 256-bit random space; the loop only matters if
        // the generator ever produces a value already on disk.
        let mut id = ScreenshotId::new();
        while fs::try_exists(self.meta_path(&id)).await? {
            id = ScreenshotId::new();
        }

        let meta = ScreenshotMeta {
            id: id.clone(),
            owner: owner.clone(),
            content_type: content_type.to_string(),
            size_bytes: content.len() as u64,
            created_at: Utc::now(),
        };

        let staged_content = self.staging_content_path(&id);
        let staged_meta = self.staging_meta_path(&id);

        let write = async {
            fs::write(&staged_content, &content).await?;
            fs::write(&staged_meta, serde_json::to_vec(&meta)?).await?;

            // Content first; the metadata rename is the commit point.
            fs::rename(&staged_content, self.content_path(&id)).await?;
            fs::rename(&staged_meta, self.meta_path(&id)).await?;
            Ok::<_, StoreError>(())
        };

        if let Err(e) = write.await {
            remove_if_present(&staged_content).await;
            remove_if_present(&staged_meta).await;
            remove_if_present(&self.content_path(&id)).await;
            return Err(e);
        }

        tracing::debug!(id = %id, owner = %owner, size = content.len(), "stored screenshot");
        Ok(id)
    }

    async fn get(&self, id: &ScreenshotId) -> StoreResult<Screenshot> {
        let meta = self.read_meta(id).await?;

        // A delete can land between the two reads; missing content then
        // means NotFound, never a partial result.
        let content = fs::read(self.content_path(id))
            .await
            .map_err(|e| io_to_store(e, id))?;

        Ok(Screenshot {
            meta,
            content: Bytes::from(content),
        })
    }

    async fn delete(&self, id: &ScreenshotId, requester: &Subject) -> StoreResult<()> {
        let meta = self.read_meta(id).await?;

        let decision = access::authorize(
            Some(requester),
            Operation::Delete,
            &meta.owner,
            ReadPolicy::default(),
        );
        if let AccessDecision::Deny(_) = decision {
            return Err(StoreError::forbidden(id.as_str(), requester.as_str()));
        }

        // Removing the metadata file makes the screenshot unobservable in
        // one step; two racing deletes resolve here, one of them NotFound.
        fs::remove_file(self.meta_path(id))
            .await
            .map_err(|e| io_to_store(e, id))?;

        remove_if_present(&self.content_path(id)).await;
        tracing::debug!(id = %id, requester = %requester, "deleted screenshot");

        Ok(())
    }

    async fn list_recent(
        &self,
        owner: &Subject,
        limit: usize,
    ) -> StoreResult<Vec<ScreenshotMeta>> {
        let meta_dir = self.root.join(META_DIR);
        let mut metas = Vec::new();

        let mut entries = fs::read_dir(&meta_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let bytes = match fs::read(entry.path()).await {
                Ok(b) => b,
                // Deleted while listing.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let meta: ScreenshotMeta = serde_json::from_slice(&bytes)?;
            if &meta.owner == owner {
                metas.push(meta);
            }
        }

        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        metas.truncate(limit);

        Ok(metas)
    }
}
