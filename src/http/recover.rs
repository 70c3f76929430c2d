//! Panic recovery middleware.
//!
//! Wraps a handler so that a panic, raised either while the handler builds
//! its future or while that future is polled, becomes a 500 response for
//! that one request instead of tearing down the connection task.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::handler::{BoxHandler, Handler, Request, Response};
use crate::http::middleware::Middleware;
use crate::http::response;

/// Converts handler panics into `500 Internal Server Error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        std::sync::Arc::new(RecoverHandler { next })
    }
}

struct RecoverHandler {
    next: BoxHandler,
}

impl Handler for RecoverHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.next.call(req))) {
            Ok(fut) => fut,
            Err(payload) => {
                log_panic(method.as_str(), &path, payload.as_ref());
                return Box::pin(async { response::internal_error() });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res,
                Err(payload) => {
                    log_panic(method.as_str(), &path, payload.as_ref());
                    response::internal_error()
                }
            }
        })
    }
}

fn log_panic(method: &str, path: &str, payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    tracing::error!(method, path, panic = message, "Handler panicked");
}
