use bytes::Bytes;
use tempfile::TempDir;

use snap_auth::Subject;
use snap_store::{FsStore, ScreenshotStore, StoreError};

fn alice() -> Subject {
    Subject::from("alice")
}

fn payload() -> Bytes {
    Bytes::from_static(b"\x89PNG\r\n\x1a\n-body")
}

/// F1. Round-trip through the filesystem
#[tokio::test]
async fn test_round_trip_bit_for_bit() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::open(dir.path()).await.unwrap();

    let id = store.put(payload(), "image/png", &alice()).await.unwrap();
    let screenshot = store.get(&id).await.unwrap();

    assert_eq!(screenshot.content, payload());
    assert_eq!(screenshot.meta.content_type, "image/png");
    assert_eq!(screenshot.meta.owner, alice());
    assert_eq!(screenshot.meta.size_bytes, payload().len() as u64);
}

/// F2. Screenshots survive a reopen
#[tokio::test]
async fn test_persists_across_reopen() {
    let dir = TempDir::new().unwrap();

    let id = {
        let store = FsStore::open(dir.path()).await.unwrap();
        store.put(payload(), "image/png", &alice()).await.unwrap()
    };

    let reopened = FsStore::open(dir.path()).await.unwrap();
    let screenshot = reopened.get(&id).await.unwrap();
    assert_eq!(screenshot.content, payload());
}

/// F3. Delete is owner-only and terminal
#[tokio::test]
async fn test_delete_ownership_and_terminality() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::open(dir.path()).await.unwrap();
    let id = store.put(payload(), "image/png", &alice()).await.unwrap();

    let forbidden = store.delete(&id, &Subject::from("bob")).await;
    assert!(matches!(forbidden, Err(StoreError::Forbidden { .. })));
    assert!(store.get(&id).await.is_ok());

    store.delete(&id, &alice()).await.unwrap();
    assert!(matches!(
        store.get(&id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete(&id, &alice()).await,
        Err(StoreError::NotFound { .. })
    ));
}

/// F4. Startup sweep removes staging leftovers and orphaned content
#[tokio::test]
async fn test_open_sweeps_uncommitted_writes() {
    let dir = TempDir::new().unwrap();

    let committed = {
        let store = FsStore::open(dir.path()).await.unwrap();
        store.put(payload(), "image/png", &alice()).await.unwrap()
    };

    // Simulate a crash between the content rename and the metadata rename:
    // a content file with no metadata row, plus a staged write.
    let orphan_content = dir.path().join("content").join("orphaned-id");
    std::fs::write(&orphan_content, b"half-written").unwrap();
    let staged = dir.path().join("staging").join("some-id.content");
    std::fs::write(&staged, b"staged").unwrap();

    let store = FsStore::open(dir.path()).await.unwrap();

    assert!(!orphan_content.exists());
    assert!(!staged.exists());

    // The committed screenshot is unaffected.
    assert!(store.get(&committed).await.is_ok());
}

/// F5. Listing is owner-scoped and newest first
#[tokio::test]
async fn test_list_recent() {
    let dir = TempDir::new().unwrap();
    let store = FsStore::open(dir.path()).await.unwrap();

    let first = store.put(payload(), "image/png", &alice()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = store.put(payload(), "image/jpeg", &alice()).await.unwrap();
    store
        .put(payload(), "image/png", &Subject::from("bob"))
        .await
        .unwrap();

    let listing = store.list_recent(&alice(), 10).await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, second);
    assert_eq!(listing[1].id, first);
}
