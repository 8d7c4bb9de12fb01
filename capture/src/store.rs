//! Append-only, per-topic Markdown logs on the local filesystem.
//!
//! The [`LogStore`] owns every log file under its root directory. Each topic
//! maps to exactly one file, `<root>/<topic><extension>`. Files are created
//! lazily on the first append, start with a single heading, and are only ever
//! extended: bytes of completed appends are never rewritten or truncated.
//!
//! Duplicate detection is a substring scan for an entry's marker line (see
//! [`Fingerprint::marker`]). There is no index; a check costs one read of the
//! topic's file.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::hash::Fingerprint;
use crate::model::{CaptureOutcome, Entry, Topic};

/// Durable, idempotent log storage keyed by topic and fingerprint.
///
/// # Thread Safety
///
/// `LogStore` is shared across request tasks behind an `Arc`. The individual
/// operations are not synchronized with each other; [`capture`] serializes
/// the duplicate check and the append for a topic so that racing requests
/// with the same payload produce a single entry. Topics never contend with
/// each other.
///
/// Only one process may write to a given root directory.
///
/// [`capture`]: LogStore::capture
pub struct LogStore {
    config: StoreConfig,
    topic_locks: Mutex<HashMap<Topic, Arc<Mutex<()>>>>,
}

impl LogStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            topic_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The directory holding every log file.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Resolves the file backing `topic`. The file may not exist yet.
    pub fn path_for(&self, topic: &Topic) -> PathBuf {
        self.config
            .root
            .join(format!("{}{}", topic, self.config.extension))
    }

    /// Creates the root directory and any missing parents.
    ///
    /// Succeeds without doing anything if the directory already exists.
    pub async fn ensure_topic_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.config.root).await?;
        Ok(())
    }

    /// Returns whether the log file for `topic` exists.
    pub async fn exists(&self, topic: &Topic) -> Result<bool> {
        Ok(fs::try_exists(self.path_for(topic)).await?)
    }

    /// Lists the log files in the root directory.
    ///
    /// Only regular files carrying the configured extension are returned.
    /// Names come back in directory enumeration order, which is unspecified.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.config.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(&self.config.extension) {
                continue;
            }
            if entry.file_type().await?.is_file() {
                files.push(name);
            }
        }
        Ok(files)
    }

    /// Returns whether `topic` already holds an entry tagged with
    /// `fingerprint`.
    ///
    /// A topic whose file does not exist has no duplicates.
    pub async fn is_duplicate(&self, topic: &Topic, fingerprint: &Fingerprint) -> Result<bool> {
        let contents = match fs::read(self.path_for(topic)).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        // Logs are meant to be hand-edited; tolerate invalid UTF-8 elsewhere
        // in the file.
        Ok(String::from_utf8_lossy(&contents).contains(&fingerprint.marker()))
    }

    /// Appends one entry for `payload` to the log of `topic`.
    ///
    /// A missing file is created with the configured heading followed by the
    /// entry. An existing file gets the entry appended after its current
    /// contents. Either way the bytes go out in a single write which is
    /// flushed and synced before this returns.
    ///
    /// If the write, flush or sync fails, the file is cut back to the length
    /// it had before the call, or removed if this call created it, and the
    /// write error is returned.
    ///
    /// This does not check for duplicates; see [`capture`](Self::capture).
    pub async fn append(
        &self,
        topic: &Topic,
        payload: Value,
        fingerprint: &Fingerprint,
    ) -> Result<Entry> {
        let path = self.path_for(topic);
        let entry = Entry::new(fingerprint.clone(), payload);
        let rendered = entry.render()?;

        let (file, bytes, rollback) = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                tracing::debug!(path = %path.display(), "creating log file");
                let bytes = format!("{}\n\n{}", self.config.heading, rendered);
                (file, bytes, Rollback::Remove)
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let file = OpenOptions::new().append(true).open(&path).await?;
                let len = file.metadata().await?.len();
                (file, rendered, Rollback::Truncate(len))
            }
            Err(err) => return Err(err.into()),
        };

        write_or_roll_back(&path, rollback, async move {
            let mut file = file;
            file.write_all(bytes.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        })
        .await?;
        Ok(entry)
    }

    /// Stores `payload` in `topic` unless an identical payload is already
    /// there.
    ///
    /// Computes the payload's fingerprint, makes sure the root directory
    /// exists, then checks for a duplicate and appends while holding the
    /// topic's lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`](crate::Error::Storage) if any filesystem
    /// operation fails. Nothing is retried.
    pub async fn capture(&self, topic: &Topic, payload: Value) -> Result<CaptureOutcome> {
        let fingerprint = Fingerprint::of(&payload);
        self.ensure_topic_directory().await?;

        let lock = self.topic_lock(topic).await;
        let _guard = lock.lock().await;

        let path = self.path_for(topic);
        if self.is_duplicate(topic, &fingerprint).await? {
            tracing::info!(hash = %fingerprint, path = %path.display(), "duplicate skipped");
            return Ok(CaptureOutcome::Duplicate { path, fingerprint });
        }

        let entry = self.append(topic, payload, &fingerprint).await?;
        tracing::info!(hash = %fingerprint, path = %path.display(), "appended");
        Ok(CaptureOutcome::Saved { path, entry })
    }

    async fn topic_lock(&self, topic: &Topic) -> Arc<Mutex<()>> {
        let mut locks = self.topic_locks.lock().await;
        locks.entry(topic.clone()).or_default().clone()
    }
}

/// How to undo a failed append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rollback {
    /// The append created the file.
    Remove,

    /// The file held this many bytes before the append.
    Truncate(u64),
}

impl Rollback {
    async fn apply(self, path: &Path) -> io::Result<()> {
        match self {
            Rollback::Remove => fs::remove_file(path).await,
            Rollback::Truncate(len) => {
                let file = OpenOptions::new().write(true).open(path).await?;
                file.set_len(len).await?;
                file.sync_data().await
            }
        }
    }
}

/// Runs `write` against the file at `path`, undoing it with `rollback` if it
/// fails.
///
/// The write error is returned either way; a failed rollback is only logged.
async fn write_or_roll_back<F>(path: &Path, rollback: Rollback, write: F) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let Err(err) = write.await else {
        return Ok(());
    };
    if let Err(rollback_err) = rollback.apply(path).await {
        tracing::error!(
            path = %path.display(),
            error = %rollback_err,
            "failed to roll back partial append"
        );
    } else {
        tracing::warn!(path = %path.display(), error = %err, "rolled back partial append");
    }
    Err(err.into())
}
