//! Configuration for the capture log store.

use std::path::PathBuf;

/// Default extension of log files.
pub const DEFAULT_EXTENSION: &str = ".md";

/// Default heading written once at the top of every new log file.
pub const DEFAULT_HEADING: &str = "# Captures";

/// Configuration for a [`LogStore`](crate::LogStore).
///
/// Built once at startup and handed to the store by value. Nothing in the
/// crate reads configuration from the environment after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding every log file. Created on demand, including any
    /// missing parent directories.
    pub root: PathBuf,

    /// File extension, including the leading dot, used both to name new
    /// logs and to recognise existing ones when listing.
    pub extension: String,

    /// Heading line written when a log file is first created.
    pub heading: String,
}

impl StoreConfig {
    /// Creates a configuration rooted at `root` with default file naming.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("captures"),
            extension: DEFAULT_EXTENSION.to_string(),
            heading: DEFAULT_HEADING.to_string(),
        }
    }
}
