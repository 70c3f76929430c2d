//! Handler contract.
//!
//! A handler receives the inbound request (with captured [`Params`] in its
//! extensions) and produces the response. Any async closure returning a
//! type that implements [`IntoResponse`] is a handler.
//!
//! [`Params`]: crate::routing::Params

use std::future::Future;
use std::sync::Arc;

use axum::response::IntoResponse;
use futures_util::future::BoxFuture;

pub use axum::extract::Request;
pub use axum::response::Response;

/// A request handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Shared, type-erased handler as stored in the route table.
pub type BoxHandler = Arc<dyn Handler>;

/// Erase a handler's concrete type.
pub fn boxed(handler: impl Handler) -> BoxHandler {
    Arc::new(handler)
}
