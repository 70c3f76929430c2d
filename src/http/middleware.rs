//! Middleware chain.
//!
//! A middleware turns one handler into another. [`Middlewares`] keeps them
//! in order and folds them around a final handler so that the first entry
//! is the outermost layer: it sees the request first and the response last.

use std::sync::Arc;

use crate::http::handler::BoxHandler;

/// A handler decorator.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// Ordered list of middlewares.
#[derive(Clone, Default)]
pub struct Middlewares {
    chain: Vec<Arc<dyn Middleware>>,
}

impl Middlewares {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `middleware` at the tail, directly around the inner handler.
    pub fn append(&mut self, middleware: impl Middleware) -> &mut Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    /// Add `middleware` at the head, making it the outermost layer.
    pub fn prepend(&mut self, middleware: impl Middleware) -> &mut Self {
        self.chain.insert(0, Arc::new(middleware));
        self
    }

    /// Compose the chain around `handler`.
    pub fn handle(&self, handler: BoxHandler) -> BoxHandler {
        self.chain
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
