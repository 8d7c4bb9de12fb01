//! Configuration for the capture HTTP server.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_EXTENSION, DEFAULT_HEADING, StoreConfig};

/// Default port of the capture listener.
pub const DEFAULT_PORT: u16 = 51741;

/// Default request body limit (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// CLI arguments for the capture server.
#[derive(Debug, Parser)]
#[command(name = "capture")]
#[command(about = "Appends JSON payloads to per-topic Markdown logs")]
pub struct CliArgs {
    /// HTTP server port.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the log files.
    ///
    /// Defaults to `~/projects/personal-notes/captures`.
    #[arg(long, env = "JSON_SERVER_DIR")]
    pub dir: Option<PathBuf>,

    /// Extension of log files, including the leading dot.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Heading written at the top of each new log file.
    #[arg(long, default_value = DEFAULT_HEADING)]
    pub heading: String,

    /// Largest request body accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Port for the admin listener serving /metrics, /-/healthy and
    /// /-/ready. Disabled when unset.
    #[arg(long)]
    pub admin_port: Option<u16>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    /// Convert CLI args to log store configuration.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            root: self.dir.clone().unwrap_or_else(default_dir),
            extension: self.extension.clone(),
            heading: self.heading.clone(),
        }
    }
}

fn default_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("projects").join("personal-notes").join("captures"),
        None => PathBuf::from("captures"),
    }
}

/// Configuration for the capture HTTP server.
#[derive(Debug, Clone)]
pub struct CaptureServerConfig {
    /// Capture listener port.
    pub port: u16,

    /// Admin listener port, if enabled.
    pub admin_port: Option<u16>,

    pub max_body_bytes: usize,
}

impl Default for CaptureServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            admin_port: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<&CliArgs> for CaptureServerConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            port: args.port,
            admin_port: args.admin_port,
            max_body_bytes: args.max_body_bytes,
        }
    }
}
