//! Network transport subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle::shutdown (coordinator)
//!     → Transport::serve (runs until stopped or until it fails)
//!     → Transport::graceful_stop (stop accepting, drain in-flight work)
//!
//! Implementations:
//!     → http::server::HttpTransport (TCP + axum)
//!     → test doubles in tests/common
//! ```
//!
//! # Design Decisions
//! - The coordinator owns signals and deadlines; a transport only knows how
//!   to serve and how to stop
//! - Returning from `serve` before a stop was requested is a fault

pub mod transport;

pub use transport::{Transport, TransportError};
