//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table with the default middleware chain
//! - Start the metrics exporter when enabled
//! - Bind the listener and hand the transport to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::{response, HttpTransport, Middlewares, Recover, RequestIdMiddleware};
use crate::lifecycle::shutdown::{listen_and_serve_with_graceful_shutdown, GracefulOpts, ShutdownError};
use crate::net::TransportError;
use crate::observability::metrics;
use crate::routing::{RouteError, Router};

/// Error type for a server run.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Route registration failed: {0}")]
    Route(#[from] RouteError),

    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid metrics address: {0}")]
    MetricsAddress(String),

    #[error("Shutdown failed: {0}")]
    Shutdown(#[from] ShutdownError),
}

/// The default chain: request ids outermost, then panic recovery.
pub fn default_middleware() -> Middlewares {
    let mut middleware = Middlewares::new();
    middleware.append(RequestIdMiddleware).append(Recover);
    middleware
}

/// Route table configured from `config`, with `GET /healthcheck` registered.
pub fn build_router(config: &ServerConfig) -> Result<Router, RouteError> {
    let router = Router::builder()
        .policy(config.routing.policy)
        .middleware(default_middleware())
        .build();

    router.get("/healthcheck", response::healthcheck)?;
    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then drain.
pub async fn run(config: &ServerConfig, router: Arc<Router>) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let transport = Arc::new(HttpTransport::bind(&config.listener, router).await?);
    tracing::info!(
        address = %transport.local_addr(),
        env = ?config.env,
        policy = ?config.routing.policy,
        "Server ready"
    );

    listen_and_serve_with_graceful_shutdown(transport, GracefulOpts::from(&config.shutdown)).await?;
    Ok(())
}
