use std::time::Duration;

use esas_storage::deadline::with_deadline;
use esas_storage::error::{OptionalExt, StorageError};
use esas_storage::memory::MemoryObjectStore;
use esas_storage::objects::ObjectStore;

#[tokio::test]
async fn get_returns_what_was_put() {
    let store = MemoryObjectStore::new();
    let etag = store
        .put_object("a/1.json", b"{}".to_vec(), Some("application/json"))
        .await
        .unwrap();

    let out = store.get_object("a/1.json").await.unwrap();
    assert_eq!(out.body, b"{}");
    assert_eq!(out.etag.as_deref(), Some(etag.as_str()));
    assert_eq!(out.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn missing_key_is_not_found() {
    let store = MemoryObjectStore::new();
    let err = store.get_object("nope").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { ref key } if key == "nope"));
    assert!(!err.is_unavailable());
    assert!(store.get_object("nope").await.optional().unwrap().is_none());
}

#[tokio::test]
async fn if_match_rejects_stale_etag() {
    let store = MemoryObjectStore::new();
    let first = store.put_object("k", b"1".to_vec(), None).await.unwrap();
    let second = store
        .put_object_if_match("k", b"2".to_vec(), None, &first)
        .await
        .unwrap();
    assert_ne!(first, second);

    let stale = store
        .put_object_if_match("k", b"3".to_vec(), None, &first)
        .await;
    assert!(matches!(stale, Err(StorageError::PreconditionFailed { .. })));
    assert_eq!(store.get_object("k").await.unwrap().body, b"2");

    let missing = store
        .put_object_if_match("other", b"x".to_vec(), None, &second)
        .await;
    assert!(matches!(missing, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
async fn if_absent_only_creates_once() {
    let store = MemoryObjectStore::new();
    store
        .put_object_if_absent("k", b"first".to_vec(), None)
        .await
        .unwrap();
    let again = store.put_object_if_absent("k", b"second".to_vec(), None).await;
    assert!(matches!(again, Err(StorageError::PreconditionFailed { .. })));
    assert_eq!(store.get_object("k").await.unwrap().body, b"first");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn list_is_prefix_scoped_and_sorted() {
    let store = MemoryObjectStore::new();
    for key in ["b/2", "a/9", "b/1", "bb/1", "c"] {
        store.put_object(key, Vec::new(), None).await.unwrap();
    }
    assert_eq!(store.list_objects("b/").await.unwrap(), vec!["b/1", "b/2"]);
    assert_eq!(store.list_objects("").await.unwrap().len(), 5);
    assert!(store.list_objects("z").await.unwrap().is_empty());

    store.delete_object("b/1").await.unwrap();
    store.delete_object("b/1").await.unwrap();
    assert_eq!(store.list_objects("b/").await.unwrap(), vec!["b/2"]);
    assert_eq!(store.write_count(), 6);
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn deadline_turns_hangs_into_timeouts() {
    let slow = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, StorageError>(())
    };
    let err = with_deadline(Duration::from_millis(10), slow).await.unwrap_err();
    assert!(matches!(err, StorageError::Timeout(_)));
    assert!(err.is_unavailable());

    let fast = async { Ok::<_, StorageError>(7) };
    assert_eq!(with_deadline(Duration::from_secs(1), fast).await.unwrap(), 7);
}
