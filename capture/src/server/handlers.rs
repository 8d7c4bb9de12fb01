//! HTTP route handlers for the capture server.
//!
//! The capture listener has a single entry point, [`handle_request`], which
//! resolves an [`Operation`] and runs it. The admin listener exposes the
//! usual operational endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::error::ApiError;
use super::metrics::Metrics;
use super::request::Operation;
use super::response::{AppendResponse, ErrorResponse, ListResponse, display_path};
use crate::model::Topic;
use crate::store::LogStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LogStore>,
    pub metrics: Arc<Metrics>,
}

/// Handle every request to the capture listener.
///
/// Errors are converted to JSON bodies here; no failure escapes the request.
/// That includes bodies the extractor refused, such as one over the size
/// limit.
pub async fn handle_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match Operation::resolve(&method, uri.path()) {
        Ok(Operation::List) => handle_list(&state).await,
        Ok(Operation::Append(topic)) => match body {
            Ok(body) => handle_append(&state, &topic, body).await,
            Err(rejection) => Err(ApiError::from(rejection)),
        },
        Ok(Operation::NotFound) => Ok(handle_not_found()),
        Err(err) => Err(ApiError::from(err)),
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

/// Handle GET /
async fn handle_list(state: &AppState) -> Result<Response, ApiError> {
    state.store.ensure_topic_directory().await?;
    let files = state.store.list().await?;
    let body = ListResponse {
        dir: display_path(state.store.root()),
        files,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Handle POST / and POST /{topic}
///
/// The body must parse as JSON; anything else is rejected before the store
/// is touched.
async fn handle_append(
    state: &AppState,
    topic: &Topic,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body)?;
    state
        .metrics
        .capture_bytes_received_total
        .inc_by(body.len() as u64);

    let outcome = state.store.capture(topic, payload).await?;
    let response = match AppendResponse::from(&outcome) {
        AppendResponse::Saved(body) => {
            state.metrics.capture_appends_total.inc();
            (StatusCode::CREATED, Json(body)).into_response()
        }
        AppendResponse::Duplicate(body) => {
            state.metrics.capture_duplicates_total.inc();
            (StatusCode::OK, Json(body)).into_response()
        }
    };
    Ok(response)
}

fn handle_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found())).into_response()
}

/// Handle GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Handle GET /-/healthy
///
/// Returns 200 OK if the service is running.
pub async fn handle_healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Handle GET /-/ready
///
/// Returns 200 OK if the storage directory exists (or can be created) and
/// can be listed.
pub async fn handle_ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let ready = match state.store.ensure_topic_directory().await {
        Ok(()) => state.store.list().await.is_ok(),
        Err(_) => false,
    };
    if ready {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}
