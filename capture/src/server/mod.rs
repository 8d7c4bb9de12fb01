//! HTTP server for capture logs.
//!
//! This module provides the HTTP surface in front of the [`LogStore`](crate::LogStore):
//! `GET /` lists log files and `POST /{topic}` appends a JSON payload.

mod config;
mod error;
pub mod handlers;
mod http;
pub mod metrics;
mod middleware;
pub mod request;
pub mod response;

pub use config::{CaptureServerConfig, CliArgs};
pub use error::ApiError;
pub use http::CaptureServer;
