use async_trait::async_trait;
use bytes::Bytes;

use snap_auth::Subject;

use crate::{Screenshot, ScreenshotId, ScreenshotMeta, StoreResult};

/// Core screenshot storage operations - must be implemented by all backends
#[async_trait]
pub trait ScreenshotStore: Send + Sync {
    /// Persist a new screenshot and return its freshly allocated id.
    ///
    /// Content and metadata become visible together or not at all: a crash
    /// or failure mid-write must never leave a partially observable
    /// screenshot behind.
    async fn put(
        &self,
        content: Bytes,
        content_type: &str,
        owner: &Subject,
    ) -> StoreResult<ScreenshotId>;

    /// Fetch a screenshot by id.
    ///
    /// Read-only and safe to call concurrently with other reads and with
    /// creates of unrelated ids. A get racing a delete on the same id
    /// observes either the full screenshot or `NotFound`.
    async fn get(&self, id: &ScreenshotId) -> StoreResult<Screenshot>;

    /// Delete a screenshot.
    ///
    /// Fails with `NotFound` if absent and `Forbidden` if `requester` is not
    /// the owner. Deletion is terminal: the id is never reissued.
    async fn delete(&self, id: &ScreenshotId, requester: &Subject) -> StoreResult<()>;

    /// List the metadata of `owner`'s most recent screenshots, newest first.
    ///
    /// Never returns entries belonging to other subjects and never exposes
    /// content.
    async fn list_recent(
        &self,
        owner: &Subject,
        limit: usize,
    ) -> StoreResult<Vec<ScreenshotMeta>>;
}
