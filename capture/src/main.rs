use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use capture::LogStore;
use capture::server::{CaptureServer, CaptureServerConfig, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = LogStore::new(args.to_store_config());
    let server = CaptureServer::new(store, CaptureServerConfig::from(&args));
    server.run().await.context("capture server failed")
}
