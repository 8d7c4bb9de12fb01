//! HTTP server wiring for the capture service.

use std::future::IntoFuture;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use super::config::CaptureServerConfig;
use super::handlers::{self, AppState};
use super::metrics::Metrics;
use super::middleware::{MetricsLayer, TracingLayer};
use crate::store::LogStore;

/// HTTP server exposing a [`LogStore`].
///
/// The capture listener accepts appends and listings. When an admin port is
/// configured, a second listener serves metrics and health checks.
pub struct CaptureServer {
    state: AppState,
    config: CaptureServerConfig,
}

impl CaptureServer {
    pub fn new(store: LogStore, config: CaptureServerConfig) -> Self {
        let state = AppState {
            store: Arc::new(store),
            metrics: Arc::new(Metrics::new()),
        };
        Self { state, config }
    }

    /// Build the capture [`Router`].
    ///
    /// Every request goes through one dispatching handler, so the router has
    /// no routes of its own, only a fallback. CORS preflights are answered by
    /// the CORS layer and never reach the dispatcher.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handlers::handle_request)
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(cors_layer())
            .layer(TracingLayer::new())
            .layer(MetricsLayer::new(self.state.metrics.clone()))
            .with_state(self.state.clone())
    }

    /// Build the admin [`Router`].
    pub fn admin_router(&self) -> Router {
        Router::new()
            .route("/metrics", get(handlers::handle_metrics))
            .route("/-/healthy", get(handlers::handle_healthy))
            .route("/-/ready", get(handlers::handle_ready))
            .with_state(self.state.clone())
    }

    /// Run the server until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if a listener cannot be bound or fails while serving.
    pub async fn run(self) -> io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("capture server listening on http://{}", addr);
        tracing::info!("saving to {}", self.state.store.root().display());

        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let admin = match self.config.admin_port {
            Some(port) => {
                let admin_addr = SocketAddr::from(([0, 0, 0, 0], port));
                let admin_listener = TcpListener::bind(admin_addr).await?;
                tracing::info!("admin server listening on http://{}", admin_addr);
                let serve = axum::serve(admin_listener, self.admin_router())
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_rx.changed().await;
                    })
                    .into_future();
                Some(tokio::spawn(serve))
            }
            None => None,
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Dropping the sender also wakes the admin listener's shutdown future.
        drop(shutdown_tx);
        if let Some(admin) = admin {
            admin.await.map_err(io::Error::other)??;
        }

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Listen for SIGTERM and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
