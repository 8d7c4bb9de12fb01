//! HTTP error types for the capture server.

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::ErrorResponse;
use crate::Error;

/// Error wrapper for converting capture errors to HTTP responses.
///
/// Error responses have the format:
/// ```json
/// { "error": "..." }
/// ```
#[derive(Debug)]
pub enum ApiError {
    /// A capture operation failed.
    Capture(Error),

    /// The request body could not be read, e.g. because it exceeds the
    /// configured limit. Carries its own status code.
    Body(BytesRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Capture(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Capture(Error::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Capture(Error::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Capture(err) => err.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Capture(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Capture(Error::from(err))
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body(rejection)
    }
}
