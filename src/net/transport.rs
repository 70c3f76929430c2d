//! The serve/stop capability the shutdown coordinator drives.

use std::future::Future;

use thiserror::Error;

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport is already serving")]
    AlreadyServing,

    #[error("Serve loop exited before shutdown was requested")]
    ExitedEarly,

    #[error("Serve task panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

/// Something that can serve traffic and be stopped gracefully.
///
/// `serve` runs until `graceful_stop` has been called (returning `Ok`) or
/// until it fails. `graceful_stop` stops accepting new work and resolves once
/// in-flight work has drained; callers bound it with their own deadline.
pub trait Transport: Send + Sync + 'static {
    fn serve(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn graceful_stop(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
