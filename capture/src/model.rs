//! Core data types for capture logs.
//!
//! This module defines the topic names that select a log file, the entries
//! written into those files, and the outcome of a capture request.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::hash::Fingerprint;

/// Topic used when a request path names no topic.
pub const DEFAULT_TOPIC: &str = "capture";

/// Name of an append-only log.
///
/// A topic is derived from a request path by stripping leading and trailing
/// slashes. What remains must be a single path component, so a topic can
/// never resolve outside the storage directory.
///
/// # Example
///
/// ```
/// use capture::Topic;
///
/// assert_eq!(Topic::from_path("/logs/").unwrap().as_str(), "logs");
/// assert_eq!(Topic::from_path("/").unwrap().as_str(), "capture");
/// assert!(Topic::from_path("/a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Parses a topic from a request path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name contains a path separator
    /// or NUL byte, or is `.` or `..`.
    pub fn from_path(path: &str) -> Result<Self> {
        let name = path.trim_matches('/');
        if name.is_empty() {
            return Ok(Self(DEFAULT_TOPIC.to_string()));
        }
        if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            return Err(Error::InvalidInput(format!("invalid topic name: {:?}", name)));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self(DEFAULT_TOPIC.to_string())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single record in a topic's log.
///
/// Entries are immutable once written. The timestamp is taken by the server
/// at append time; clients cannot supply it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub fingerprint: Fingerprint,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl Entry {
    /// Creates an entry stamped with the current time.
    pub fn new(fingerprint: Fingerprint, payload: Value) -> Self {
        Self {
            fingerprint,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Renders the entry as it appears in a log file.
    ///
    /// ````text
    /// <!-- hash:<fingerprint> -->
    /// ## <timestamp>
    ///
    /// ```json
    /// <payload, 2-space indent>
    /// ```
    ///
    /// ````
    ///
    /// The marker line comes first so that a plain substring scan finds it.
    pub fn render(&self) -> Result<String> {
        let payload = serde_json::to_string_pretty(&self.payload)
            .map_err(|e| Error::Internal(format!("failed to render payload: {}", e)))?;
        let marker = self.fingerprint.marker();
        let heading = format!(
            "## {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        Ok([
            marker.as_str(),
            heading.as_str(),
            "",
            "```json",
            payload.as_str(),
            "```",
            "",
        ]
        .join("\n"))
    }
}

/// Result of a capture request against the log store.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The payload was new and has been appended.
    Saved { path: PathBuf, entry: Entry },

    /// The topic already holds an entry with this fingerprint; nothing was
    /// written.
    Duplicate {
        path: PathBuf,
        fingerprint: Fingerprint,
    },
}

impl CaptureOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            CaptureOutcome::Saved { path, .. } | CaptureOutcome::Duplicate { path, .. } => path,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            CaptureOutcome::Saved { entry, .. } => &entry.fingerprint,
            CaptureOutcome::Duplicate { fingerprint, .. } => fingerprint,
        }
    }
}
