//! End-to-end tests for the capture HTTP API.
//!
//! These drive the router in-process with `tower::ServiceExt::oneshot` and
//! inspect the log files it writes under a temporary directory.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use capture::server::response::{DuplicateResponse, ErrorResponse, ListResponse, SavedResponse};
use capture::server::{CaptureServer, CaptureServerConfig};
use capture::{LogStore, StoreConfig};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestServer {
    _dir: TempDir,
    root: PathBuf,
    server: CaptureServer,
}

impl TestServer {
    fn new() -> Self {
        Self::with_config(CaptureServerConfig::default())
    }

    fn with_config(config: CaptureServerConfig) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("captures");
        let store = LogStore::new(StoreConfig::new(&root));
        Self {
            _dir: dir,
            root,
            server: CaptureServer::new(store, config),
        }
    }

    fn app(&self) -> Router {
        self.server.router()
    }

    async fn send(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn post<T: DeserializeOwned>(&self, uri: &str, body: &str) -> (StatusCode, T) {
        let (status, bytes) = self.send(Method::POST, uri, body).await;
        let parsed = serde_json::from_slice(&bytes).expect("valid JSON response");
        (status, parsed)
    }

    async fn list(&self) -> ListResponse {
        let (status, bytes) = self.send(Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&bytes).expect("valid JSON response")
    }

    fn read_log(&self, name: &str) -> String {
        std::fs::read_to_string(self.root.join(name)).expect("log file should exist")
    }
}

fn entry_count(contents: &str) -> usize {
    contents.matches("<!-- hash:").count()
}

#[tokio::test]
async fn should_save_deduplicate_and_list() {
    let server = TestServer::new();

    // first post creates the log
    let (status, saved): (_, SavedResponse) = server.post("/logs", r#"{"a":1}"#).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(PathBuf::from(&saved.saved), server.root.join("logs.md"));
    assert_eq!(saved.hash.len(), 12);
    assert_eq!(entry_count(&server.read_log("logs.md")), 1);

    // identical payload is reported as a duplicate
    let (status, duplicate): (_, DuplicateResponse) = server.post("/logs", r#"{"a":1}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(duplicate.duplicate);
    assert_eq!(duplicate.file, saved.saved);
    assert_eq!(duplicate.hash, saved.hash);
    assert_eq!(entry_count(&server.read_log("logs.md")), 1);

    // a different payload is appended
    let (status, second): (_, SavedResponse) = server.post("/logs", r#"{"a":2}"#).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(second.hash, saved.hash);
    let contents = server.read_log("logs.md");
    assert_eq!(entry_count(&contents), 2);
    assert!(contents.find(&saved.hash).unwrap() < contents.find(&second.hash).unwrap());

    // the listing includes the log
    let listing = server.list().await;
    assert_eq!(PathBuf::from(&listing.dir), server.root);
    assert!(listing.files.contains(&"logs.md".to_string()));
}

#[tokio::test]
async fn should_write_log_in_markdown_format() {
    let server = TestServer::new();

    let (_, saved): (_, SavedResponse) = server.post("/notes", r#"{"b":[1,2]}"#).await;

    let contents = server.read_log("notes.md");
    let expected_prefix = format!("# Captures\n\n<!-- hash:{} -->\n## ", saved.hash);
    assert!(contents.starts_with(&expected_prefix), "{contents}");
    assert!(contents.ends_with("\n\n```json\n{\n  \"b\": [\n    1,\n    2\n  ]\n}\n```\n"));
}

#[tokio::test]
async fn should_use_default_topic_for_root() {
    let server = TestServer::new();

    let (status, saved): (_, SavedResponse) = server.post("/", r#"["x"]"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(PathBuf::from(saved.saved), server.root.join("capture.md"));
}

#[tokio::test]
async fn should_strip_slashes_from_topic() {
    let server = TestServer::new();

    let (status, saved): (_, SavedResponse) = server.post("/logs/", "1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(PathBuf::from(saved.saved), server.root.join("logs.md"));
}

#[tokio::test]
async fn should_reject_malformed_json_without_creating_file() {
    let server = TestServer::new();

    let (status, error): (_, ErrorResponse) = server.post("/metrics", "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!error.error.is_empty());
    assert!(!server.root.join("metrics.md").exists());
}

#[tokio::test]
async fn should_reject_malformed_json_without_mutating_existing_file() {
    let server = TestServer::new();
    let (status, _): (_, SavedResponse) = server.post("/metrics", r#"{"cpu":1}"#).await;
    assert_eq!(status, StatusCode::CREATED);
    let before = server.read_log("metrics.md");

    let (status, _): (_, ErrorResponse) = server.post("/metrics", "{\"cpu\":").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.read_log("metrics.md"), before);
}

#[tokio::test]
async fn should_keep_topics_isolated() {
    let server = TestServer::new();
    let (_, _): (_, SavedResponse) = server.post("/metrics", r#"{"v":1}"#).await;
    let before = server.read_log("metrics.md");

    let (status, _): (_, SavedResponse) = server.post("/logs", r#"{"v":1}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(server.read_log("metrics.md"), before);
}

#[tokio::test]
async fn should_reject_topic_outside_storage_directory() {
    let server = TestServer::new();

    let (status, _): (_, ErrorResponse) = server.post("/nested/topic", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!server.root.join("nested").exists());
}

#[tokio::test]
async fn should_return_not_found_for_other_requests() {
    let server = TestServer::new();

    let requests = [
        (Method::GET, "/logs"),
        (Method::DELETE, "/"),
        (Method::PUT, "/logs"),
    ];
    for (method, uri) in requests {
        let (status, bytes) = server.send(method, uri, "").await;
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "not found");
    }
}

fn header_list(response: &Response<Body>, name: &str) -> Vec<String> {
    response.headers()[name]
        .to_str()
        .unwrap()
        .split(',')
        .map(|value| value.trim().to_ascii_uppercase())
        .collect()
}

#[tokio::test]
async fn should_answer_preflight_with_cors_headers() {
    let server = TestServer::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/logs")
        .header("origin", "https://example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = server.app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        header_list(&response, "access-control-allow-methods"),
        vec!["GET", "POST", "OPTIONS"]
    );
    assert_eq!(
        header_list(&response, "access-control-allow-headers"),
        vec!["CONTENT-TYPE"]
    );
    assert!(!server.root.exists());
}

#[tokio::test]
async fn should_allow_any_origin_on_captures() {
    let server = TestServer::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/logs")
        .header("origin", "https://example.com")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"a":1}"#))
        .unwrap();

    let response = server.app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn should_list_empty_directory_after_creating_it() {
    let server = TestServer::new();
    assert!(!server.root.exists());

    let listing = server.list().await;

    assert!(listing.files.is_empty());
    assert!(server.root.is_dir());
}

#[tokio::test]
async fn should_report_storage_failure_as_server_error() {
    let server = TestServer::new();
    std::fs::write(&server.root, "a file where the directory should be").unwrap();

    let (status, error): (_, ErrorResponse) = server.post("/logs", r#"{"a":1}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error.error.starts_with("Storage error"));
}

#[tokio::test]
async fn should_reject_body_over_limit() {
    let server = TestServer::with_config(CaptureServerConfig {
        max_body_bytes: 16,
        ..Default::default()
    });

    let (status, error): (_, ErrorResponse) = server
        .post("/logs", r#"{"payload":"longer than sixteen bytes"}"#)
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!error.error.is_empty());
    assert!(!server.root.join("logs.md").exists());
}

#[tokio::test]
async fn should_serve_admin_endpoints() {
    let server = TestServer::new();
    let (_, _): (_, SavedResponse) = server.post("/logs", r#"{"a":1}"#).await;

    let get = |uri: &'static str| {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let healthy = server.server.admin_router().oneshot(get("/-/healthy")).await.unwrap();
    assert_eq!(healthy.status(), StatusCode::OK);

    let ready = server.server.admin_router().oneshot(get("/-/ready")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    let metrics = server.server.admin_router().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let body = metrics.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("capture_appends_total 1"));
    assert!(text.contains("http_requests_total"));
}
