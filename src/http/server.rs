//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the ingress handlers
//! - Wire up middleware (tracing)
//! - Bind the server to a listener and serve until shutdown

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::backend::{BackendClient, BackendError};
use crate::config::BridgeConfig;
use crate::http::{ingress, websocket};
use crate::observability::Stats;
use crate::session::SessionRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub backend: Arc<BackendClient>,
    pub stats: Arc<Stats>,
    /// Capacity of each per-connection inbound and outbound queue.
    pub queue_capacity: usize,
}

/// The bridge's ingress server.
pub struct BridgeServer {
    router: Router,
}

impl BridgeServer {
    /// Assemble registry, backend client, and statistics sink from config.
    pub fn new(config: &BridgeConfig) -> Result<Self, BackendError> {
        let stats = Arc::new(Stats::new());
        let backend = Arc::new(BackendClient::new(
            &config.backend,
            config.retries.clone(),
            Arc::clone(&stats),
        )?);
        let state = AppState {
            registry: Arc::new(SessionRegistry::new()),
            backend,
            stats,
            queue_capacity: config.queues.capacity,
        };
        Ok(Self {
            router: build_router(state),
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "bridge listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("bridge stopped");
        Ok(())
    }
}

/// Build the Axum router. A single wildcard route carries the whole
/// surface; the first path segment is the session address.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(ingress::statistics).post(ingress::push_empty_address),
        )
        .route(
            "/{*path}",
            get(websocket::connect).post(ingress::push),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
