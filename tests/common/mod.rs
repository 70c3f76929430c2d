//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use minimux::lifecycle::{GracefulOpts, GracefulShutdown, Shutdown, ShutdownError};
use minimux::{HttpTransport, Router, Transport, TransportError};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// HTTP client that bypasses proxies and never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A router served on an ephemeral port under a shutdown coordinator.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ShutdownError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the coordinator's result.
    pub async fn stop(self) -> Result<(), ShutdownError> {
        self.shutdown.trigger();
        self.handle.await.unwrap()
    }
}

pub async fn start_server(router: Router, opts: GracefulOpts) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let transport = Arc::new(HttpTransport::from_listener(listener, Arc::new(router)).unwrap());
    let addr = transport.local_addr();

    let shutdown = Shutdown::new();
    let handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            GracefulShutdown::new(opts)
                .without_signals()
                .run(transport, &shutdown)
                .await
        })
    };

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// How a [`MockTransport`]'s serve loop behaves.
#[derive(Debug, Clone)]
pub enum ServeBehavior {
    /// Serve until `graceful_stop` is called.
    UntilStopped,
    /// Fail with the given message after a delay.
    FailAfter(Duration, &'static str),
    /// Return `Ok` after a delay without being stopped.
    ExitAfter(Duration),
    /// Panic after a delay.
    PanicAfter(Duration),
}

/// Scriptable transport for coordinator tests.
pub struct MockTransport {
    behavior: ServeBehavior,
    stop_delay: Duration,
    stop_error: Option<&'static str>,
    stopped: watch::Sender<bool>,
    pub serve_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(behavior: ServeBehavior) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            behavior,
            stop_delay: Duration::ZERO,
            stop_error: None,
            stopped,
            serve_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Make `graceful_stop` take this long.
    pub fn stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    /// Make `graceful_stop` fail with this message.
    pub fn stop_error(mut self, message: &'static str) -> Self {
        self.stop_error = Some(message);
        self
    }

    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    async fn serve(&self) -> Result<(), TransportError> {
        self.serve_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ServeBehavior::UntilStopped => {
                let mut stopped = self.stopped.subscribe();
                let _ = stopped.wait_for(|stopped| *stopped).await;
                Ok(())
            }
            ServeBehavior::FailAfter(delay, message) => {
                tokio::time::sleep(delay).await;
                Err(TransportError::Failed(message.to_string()))
            }
            ServeBehavior::ExitAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            ServeBehavior::PanicAfter(delay) => {
                tokio::time::sleep(delay).await;
                panic!("serve loop exploded");
            }
        }
    }

    async fn graceful_stop(&self) -> Result<(), TransportError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.stop_delay).await;
        self.stopped.send_replace(true);
        match self.stop_error {
            Some(message) => Err(TransportError::Failed(message.to_string())),
            None => Ok(()),
        }
    }
}
