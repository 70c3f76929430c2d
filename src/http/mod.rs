//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (HttpTransport: Axum connection plumbing)
//!     → routing::Router::dispatch (match, attach params)
//!     → middleware.rs (chain: request.rs, recover.rs, user middlewares)
//!     → handler.rs (user handler)
//!     → response.rs (built-in responses)
//!     → Send to client
//! ```

pub mod handler;
pub mod middleware;
pub mod recover;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{boxed, BoxHandler, Handler, Request, Response};
pub use middleware::{Middleware, Middlewares};
pub use recover::Recover;
pub use request::{RequestId, RequestIdExt, RequestIdMiddleware, X_REQUEST_ID};
pub use server::HttpTransport;
