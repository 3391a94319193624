use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use snap_auth::{SigningOptions, Subject};
use snap_service::{
    Request, Response, ScreenshotService, ServiceError, ServiceOptions, StorageLocation,
};
use snap_store::MemoryStore;

fn options() -> ServiceOptions {
    ServiceOptions::new(
        SigningOptions::new("scenario-test-secret-material")
            .with_token_timeout(Duration::from_secs(30)),
    )
}

fn memory_service() -> ScreenshotService {
    ScreenshotService::new(options(), Arc::new(MemoryStore::new())).unwrap()
}

/// t=0 for the scenario clock
fn t(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
}

/// The full upload/fetch/delete walk-through:
/// issue for "alice" with timeout 30s at t=0; upload 10 bytes at t=5;
/// fetch at t=10; delete by "bob" at t=10 is Forbidden; delete by "alice"
/// succeeds; fetch at t=11 is NotFound.
#[tokio::test]
async fn test_upload_fetch_delete_walkthrough() {
    let svc = memory_service();
    let payload = Bytes::from_static(b"0123456789");

    let alice = svc.issue_token(&Subject::from("alice"), t(0)).unwrap();
    assert_eq!(alice.token_type, "bearer");
    assert_eq!(alice.expires_at, t(30));

    let id = svc
        .upload(&alice.access_token, payload.clone(), "image/png", t(5))
        .await
        .unwrap();

    let fetched = svc.fetch(None, &id, t(10)).await.unwrap();
    assert_eq!(fetched.content, payload);
    assert_eq!(fetched.meta.content_type, "image/png");

    let bob = svc.issue_token(&Subject::from("bob"), t(0)).unwrap();
    let forbidden = svc.remove(&bob.access_token, &id, t(10)).await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden)));

    svc.remove(&alice.access_token, &id, t(10)).await.unwrap();

    let gone = svc.fetch(None, &id, t(11)).await;
    assert!(matches!(gone, Err(ServiceError::NotFound { .. })));
}

/// The same walk-through against the filesystem backend, built from
/// startup options the way a real process would.
#[tokio::test]
async fn test_walkthrough_on_filesystem_store() {
    let dir = TempDir::new().unwrap();
    let svc = ScreenshotService::from_options(options().with_storage(
        StorageLocation::Filesystem {
            root: dir.path().to_path_buf(),
        },
    ))
    .await
    .unwrap();

    let payload = Bytes::from_static(b"0123456789");
    let alice = svc.issue_token(&Subject::from("alice"), t(0)).unwrap();

    let id = svc
        .upload(&alice.access_token, payload.clone(), "image/png", t(5))
        .await
        .unwrap();
    assert_eq!(svc.fetch(None, &id, t(10)).await.unwrap().content, payload);

    svc.remove(&alice.access_token, &id, t(10)).await.unwrap();
    assert!(matches!(
        svc.fetch(None, &id, t(11)).await,
        Err(ServiceError::NotFound { .. })
    ));
}

/// Tokens stop working at exactly expires_at, and before that keep working.
#[tokio::test]
async fn test_token_expiry_boundary_through_the_service() {
    let svc = memory_service();
    let alice = svc.issue_token(&Subject::from("alice"), t(0)).unwrap();
    let payload = Bytes::from_static(b"x");

    // t=29: still valid.
    svc.upload(&alice.access_token, payload.clone(), "image/png", t(29))
        .await
        .unwrap();

    // t=30: expired, and indistinguishable from any other bad token.
    let expired = svc
        .upload(&alice.access_token, payload, "image/png", t(30))
        .await;
    assert!(matches!(expired, Err(ServiceError::Unauthenticated)));
}

/// A tampered token is rejected as unauthenticated, never as some more
/// specific failure.
#[tokio::test]
async fn test_tampered_token_is_unauthenticated() {
    let svc = memory_service();
    let alice = svc.issue_token(&Subject::from("alice"), t(0)).unwrap();

    let (head, signature) = alice.access_token.rsplit_once('.').unwrap();
    let mut sig: Vec<char> = signature.chars().collect();
    let mid = sig.len() / 2;
    sig[mid] = if sig[mid] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}", head, sig.into_iter().collect::<String>());

    let result = svc
        .upload(&tampered, Bytes::from_static(b"x"), "image/png", t(1))
        .await;
    assert!(matches!(result, Err(ServiceError::Unauthenticated)));
}

/// Every operation reaches its handler through the static dispatch table.
#[tokio::test]
async fn test_dispatch_covers_every_operation() {
    let svc = memory_service();

    let token = match svc
        .dispatch(
            Request::IssueToken {
                subject: Subject::from("alice"),
            },
            t(0),
        )
        .await
        .unwrap()
    {
        Response::Token(token) => token,
        other => panic!("unexpected response: {:?}", other),
    };

    let id = match svc
        .dispatch(
            Request::Upload {
                token: token.access_token.clone(),
                content: Bytes::from_static(b"pix"),
                content_type: "image/png".to_string(),
            },
            t(1),
        )
        .await
        .unwrap()
    {
        Response::Created { id } => id,
        other => panic!("unexpected response: {:?}", other),
    };

    match svc
        .dispatch(Request::Fetch { token: None, id: id.clone() }, t(2))
        .await
        .unwrap()
    {
        Response::Screenshot(s) => assert_eq!(s.content, Bytes::from_static(b"pix")),
        other => panic!("unexpected response: {:?}", other),
    }

    match svc
        .dispatch(
            Request::Recent {
                token: token.access_token.clone(),
                limit: 5,
            },
            t(2),
        )
        .await
        .unwrap()
    {
        Response::Listing(listing) => assert_eq!(listing.len(), 1),
        other => panic!("unexpected response: {:?}", other),
    }

    match svc
        .dispatch(
            Request::Delete {
                token: token.access_token,
                id,
            },
            t(3),
        )
        .await
        .unwrap()
    {
        Response::Deleted => {}
        other => panic!("unexpected response: {:?}", other),
    }
}
