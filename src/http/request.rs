//! Request ID middleware.
//!
//! # Responsibilities
//! - Reuse the caller's `x-request-id` or generate a UUID v4
//! - Expose the id to handlers through the request extensions
//! - Run the handler inside a tracing span carrying the id
//! - Echo the id on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, so install this
//!   middleware at the head of the chain

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderValue;
use futures_util::future::BoxFuture;
use tracing::Instrument;
use uuid::Uuid;

use crate::http::handler::{BoxHandler, Handler, Request, Response};
use crate::http::middleware::Middleware;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh UUID v4 id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access the [`RequestId`] attached by [`RequestIdMiddleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for Request {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Tags every request with a [`RequestId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(RequestIdHandler { next })
    }
}

struct RequestIdHandler {
    next: BoxHandler,
}

impl Handler for RequestIdHandler {
    fn call(&self, mut req: Request) -> BoxFuture<'static, Response> {
        let id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_owned()))
            .unwrap_or_default();
        let header = HeaderValue::from_str(id.as_str()).ok();

        if let Some(value) = &header {
            req.headers_mut().insert(X_REQUEST_ID, value.clone());
        }
        let span = tracing::info_span!(
            "request",
            request_id = %id,
            method = %req.method(),
            path = %req.uri().path(),
        );
        req.extensions_mut().insert(id);

        let fut = span.in_scope(|| self.next.call(req));
        Box::pin(async move {
            let mut res = fut.instrument(span).await;
            if let Some(value) = header {
                res.headers_mut().insert(X_REQUEST_ID, value);
            }
            res
        })
    }
}
