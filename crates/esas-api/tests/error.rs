use std::time::Duration;

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use esas_api::error::ApiError;
use esas_linker::LinkError;
use esas_storage::error::StorageError;
use serde_json::Value;

async fn respond(err: ApiError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn storage_failure_during_link_is_generic_unavailable() {
    let wrapped = [
        StorageError::NotFound {
            key: "accounts/acct-1.json".to_string(),
        },
        StorageError::Serialization(serde_json::from_str::<Value>("{").unwrap_err()),
        StorageError::Timeout(Duration::from_millis(50)),
    ];

    for inner in wrapped {
        let (status, body) = respond(LinkError::StorageUnavailable(inner).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("try again"));
        assert!(!message.contains("accounts/"));
    }
}

#[tokio::test]
async fn storage_errors_map_by_kind() {
    let (status, _) = respond(
        StorageError::NotFound {
            key: "screenings/x.json".to_string(),
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = respond(
        StorageError::PreconditionFailed {
            key: "screenings/x.json".to_string(),
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = respond(StorageError::GetObject("connection reset".to_string()).into()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body["error"].as_str().unwrap().contains("connection reset"));

    let bad_json = serde_json::from_str::<Value>("{").unwrap_err();
    let (status, _) = respond(StorageError::Serialization(bad_json).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
