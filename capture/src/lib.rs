//! Capture: append JSON payloads to per-topic Markdown logs.
//!
//! Clients POST JSON to `/{topic}`. Each payload lands in `<topic>.md` under
//! the storage directory as a timestamped, fenced code block tagged with a
//! content fingerprint. Posting the same payload to the same topic again is
//! detected by that fingerprint and skipped.
//!
//! # Example
//!
//! ```no_run
//! use capture::{CaptureOutcome, LogStore, StoreConfig, Topic};
//! use serde_json::json;
//!
//! # async fn example() -> capture::Result<()> {
//! let store = LogStore::new(StoreConfig::new("/tmp/captures"));
//! let topic = Topic::from_path("/logs")?;
//!
//! match store.capture(&topic, json!({"level": "info"})).await? {
//!     CaptureOutcome::Saved { path, .. } => println!("saved to {}", path.display()),
//!     CaptureOutcome::Duplicate { .. } => println!("already captured"),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod hash;
mod model;
pub mod server;
mod store;

pub use config::{DEFAULT_EXTENSION, DEFAULT_HEADING, StoreConfig};
pub use error::{Error, Result};
pub use hash::{FINGERPRINT_LEN, Fingerprint};
pub use model::{CaptureOutcome, DEFAULT_TOPIC, Entry, Topic};
pub use store::LogStore;
