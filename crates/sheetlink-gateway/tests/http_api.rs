use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sheetlink_core::{Row, StorageError, TabularStore};
use sheetlink_gateway::{App, AppState};
use sheetlink_mapping::{DuplicatePolicy, MappingService};
use sheetlink_storage::InMemoryTable;
use tower::ServiceExt;

fn router_with<S: TabularStore>(service: MappingService<S>) -> Router {
    App::router(AppState::new(Arc::new(service)))
}

fn router() -> Router {
    router_with(MappingService::new(InMemoryTable::new()))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Fails every call with a fixed storage error.
struct FailingStore(StorageError);

#[async_trait]
impl TabularStore for FailingStore {
    async fn append(&self, _row: Row) -> sheetlink_core::error::Result<()> {
        Err(self.0.clone())
    }

    async fn read_range(&self) -> sheetlink_core::error::Result<Vec<Option<Row>>> {
        Err(self.0.clone())
    }
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&router(), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn post_creates_and_echoes_mapping() {
    let router = router();
    let payload = json!({ "shortUrl": "abc123", "longUrl": "https://example.com" });

    let (status, body) = send(&router, Method::POST, "/mapping", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, payload);

    let (status, body) = send(&router, Method::GET, "/mapping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([payload]));
}

#[tokio::test]
async fn get_lists_in_insertion_order() {
    let router = router();

    for i in 1..=3 {
        let payload = json!({
            "shortUrl": format!("s{i}"),
            "longUrl": format!("https://{i}.example")
        });
        let (status, _) = send(&router, Method::POST, "/mapping", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&router, Method::GET, "/mapping", None).await;
    assert_eq!(
        body,
        json!([
            { "shortUrl": "s1", "longUrl": "https://1.example" },
            { "shortUrl": "s2", "longUrl": "https://2.example" },
            { "shortUrl": "s3", "longUrl": "https://3.example" },
        ])
    );
}

#[tokio::test]
async fn get_on_empty_store_is_empty_list() {
    let (status, body) = send(&router(), Method::GET, "/mapping", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn missing_fields_are_stored_empty() {
    let router = router();

    let (status, body) = send(&router, Method::POST, "/mapping", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "shortUrl": "", "longUrl": "" }));

    let (status, body) = send(&router, Method::POST, "/mapping", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "shortUrl": "", "longUrl": "" }));

    let (_, body) = send(&router, Method::GET, "/mapping", None).await;
    assert_eq!(
        body,
        json!([
            { "shortUrl": "", "longUrl": "" },
            { "shortUrl": "", "longUrl": "" },
        ])
    );
}

#[tokio::test]
async fn non_string_fields_are_stored_as_text() {
    let router = router();
    let payload = json!({ "shortUrl": 123, "longUrl": "https://example.com" });

    let (status, body) = send(&router, Method::POST, "/mapping", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "shortUrl": "123", "longUrl": "https://example.com" }));

    let (_, body) = send(&router, Method::GET, "/mapping", None).await;
    assert_eq!(body, json!([{ "shortUrl": "123", "longUrl": "https://example.com" }]));
}

#[tokio::test]
async fn non_object_body_is_stored_empty() {
    let router = router();

    let (status, body) = send(&router, Method::POST, "/mapping", Some(json!([]))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "shortUrl": "", "longUrl": "" }));
}

#[tokio::test]
async fn duplicates_are_listed_twice() {
    let router = router();

    for long_url in ["https://one.example", "https://two.example"] {
        let payload = json!({ "shortUrl": "dup", "longUrl": long_url });
        send(&router, Method::POST, "/mapping", Some(payload)).await;
    }

    let (_, body) = send(&router, Method::GET, "/mapping", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reject_policy_returns_conflict() {
    let router = router_with(
        MappingService::new(InMemoryTable::new()).with_duplicate_policy(DuplicatePolicy::Reject),
    );
    let payload = json!({ "shortUrl": "dup", "longUrl": "https://one.example" });

    let (status, _) = send(&router, Method::POST, "/mapping", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, Method::POST, "/mapping", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("dup"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let router = router();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/mapping")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
    let router = router();

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let (status, _) = send(&router, method, "/mapping", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[tokio::test]
async fn storage_failures_map_to_gateway_errors() {
    let cases = [
        (StorageError::Unauthorized("invalid_grant".into()), StatusCode::BAD_GATEWAY),
        (StorageError::Unavailable("connection refused".into()), StatusCode::SERVICE_UNAVAILABLE),
        (StorageError::Timeout("deadline".into()), StatusCode::GATEWAY_TIMEOUT),
        (StorageError::Configuration("bad key".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        let router = router_with(MappingService::new(FailingStore(error)));

        let (status, body) = send(&router, Method::GET, "/mapping", None).await;
        assert_eq!(status, expected);
        assert!(body["error"].is_string());

        let payload = json!({ "shortUrl": "abc", "longUrl": "https://example.com" });
        let (status, _) = send(&router, Method::POST, "/mapping", Some(payload)).await;
        assert_eq!(status, expected);
    }
}
