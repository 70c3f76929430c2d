//! HTTP transport.
//!
//! # Responsibilities
//! - Bind the TCP listener
//! - Serve every request through the route table via an Axum fallback
//! - Stop accepting on `graceful_stop` and report when in-flight requests
//!   have drained
//!
//! # Design Decisions
//! - Axum only provides the connection plumbing; all matching happens in
//!   `routing::Router`
//! - The listener is taken on the first `serve`, so a transport serves once

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::ListenerConfig;
use crate::http::handler::{Request, Response};
use crate::net::{Transport, TransportError};
use crate::routing::Router;

/// Serves a `Router` over HTTP/1.1.
pub struct HttpTransport {
    router: Arc<Router>,
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    stopped: watch::Sender<bool>,
}

impl HttpTransport {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig, router: Arc<Router>) -> Result<Self, TransportError> {
        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        Self::from_listener(listener, router)
    }

    /// Use an already bound listener.
    pub fn from_listener(listener: TcpListener, router: Arc<Router>) -> Result<Self, TransportError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(address = %local_addr, "Listener bound");

        let (stop, _) = watch::channel(false);
        let (stopped, _) = watch::channel(false);

        Ok(Self {
            router,
            listener: Mutex::new(Some(listener)),
            local_addr,
            stop,
            stopped,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    fn take_listener(&self) -> Option<TcpListener> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Transport for HttpTransport {
    async fn serve(&self) -> Result<(), TransportError> {
        let listener = self.take_listener().ok_or(TransportError::AlreadyServing)?;

        let app = axum::Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&self.router));

        let mut stop = self.stop.subscribe();
        tracing::info!(address = %self.local_addr, "HTTP server starting");

        let result = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = stop.wait_for(|stop| *stop).await;
            })
            .await;

        tracing::info!("HTTP server stopped");
        self.stopped.send_replace(true);
        result.map_err(TransportError::from)
    }

    async fn graceful_stop(&self) -> Result<(), TransportError> {
        self.stop.send_replace(true);

        // Never served: dropping the listener is the whole drain.
        if self.take_listener().is_some() {
            self.stopped.send_replace(true);
            return Ok(());
        }

        let mut stopped = self.stopped.subscribe();
        stopped
            .wait_for(|stopped| *stopped)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Failed(e.to_string()))
    }
}

async fn dispatch(State(router): State<Arc<Router>>, req: Request) -> Response {
    router.dispatch(req).await
}
