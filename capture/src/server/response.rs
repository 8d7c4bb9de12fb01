//! Response bodies for the capture server.
//!
//! All bodies serialize to JSON objects whose field names are part of the
//! public interface; existing clients match on them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::CaptureOutcome;

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// The storage directory.
    pub dir: String,
    /// Log file names, in directory order.
    pub files: Vec<String>,
}

/// Body of a `201` reply to an append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResponse {
    /// Path of the log file the entry went to.
    pub saved: String,
    pub hash: String,
}

/// Body of a `200` reply to an append whose payload was already present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateResponse {
    /// Always `true`.
    pub duplicate: bool,
    pub file: String,
    pub hash: String,
}

/// Body of every error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn not_found() -> Self {
        Self {
            error: "not found".to_string(),
        }
    }
}

/// Reply to an append, one variant per [`CaptureOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendResponse {
    Saved(SavedResponse),
    Duplicate(DuplicateResponse),
}

impl From<&CaptureOutcome> for AppendResponse {
    fn from(outcome: &CaptureOutcome) -> Self {
        let path = display_path(outcome.path());
        let hash = outcome.fingerprint().to_string();
        match outcome {
            CaptureOutcome::Saved { .. } => {
                AppendResponse::Saved(SavedResponse { saved: path, hash })
            }
            CaptureOutcome::Duplicate { .. } => AppendResponse::Duplicate(DuplicateResponse {
                duplicate: true,
                file: path,
                hash,
            }),
        }
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
