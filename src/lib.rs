//! minimux: an embeddable HTTP request router.
//!
//! Per-method routing trie with named wildcard segments, a concurrency-safe
//! route table, an ordered middleware chain, and a signal-driven graceful
//! shutdown coordinator.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{Handler, HttpTransport, Middleware, Middlewares, Request, Response};
pub use lifecycle::{
    listen_and_serve_with_graceful_shutdown, GracefulOpts, GracefulShutdown, Shutdown, ShutdownError,
};
pub use net::{Transport, TransportError};
pub use routing::{Params, RegistrationPolicy, RouteError, Router};
