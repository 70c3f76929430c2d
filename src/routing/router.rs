//! Route table and dispatch.
//!
//! # Responsibilities
//! - Validate and register routes per method
//! - Look up the route for a request and attach captured parameters
//! - Run the matched handler (or the not-found fallback) through the
//!   middleware chain
//!
//! # Design Decisions
//! - One `RwLock` over the whole trie: lookups share, registrations exclude
//! - The lock is released before any handler runs; nothing is held across
//!   an `.await`
//! - Multi-method registration happens in a single critical section and,
//!   in strict mode, is checked in full before anything is inserted
//! - A method mismatch is a plain miss (404), not 405

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::http::handler::{boxed, BoxHandler, Handler, Request, Response};
use crate::http::middleware::Middlewares;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::error::RouteError;
use crate::routing::params::Params;
use crate::routing::tree::{segments, wildcard_key, Node, Route};

/// Methods bound by [`Router::any`] and [`Router::handle`] unless extended.
pub const DEFAULT_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
];

/// What to do when a (method, pattern) pair is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Reject with [`RouteError::DuplicateRegistration`].
    #[default]
    Strict,
    /// Silently replace the earlier handler.
    Lenient,
}

/// Pattern of the route that served a request, stored in its extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPattern(pub String);

/// A resolved route, detached from the table.
#[derive(Clone)]
pub struct RouteMatch {
    pub method: Method,
    pub pattern: String,
    pub handler: BoxHandler,
    pub params: Params,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Router`].
pub struct RouterBuilder {
    policy: RegistrationPolicy,
    methods: Vec<Method>,
    middleware: Middlewares,
    not_found: Option<BoxHandler>,
}

impl RouterBuilder {
    pub fn policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a method to the set bound by `any`/`handle`.
    pub fn support_method(mut self, method: Method) -> Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn middleware(mut self, middleware: Middlewares) -> Self {
        self.middleware = middleware;
        self
    }

    /// Replace the default 404 fallback.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = Some(boxed(handler));
        self
    }

    pub fn build(self) -> Router {
        Router {
            tree: RwLock::new(Node::new()),
            policy: self.policy,
            methods: self.methods,
            middleware: self.middleware,
            not_found: self
                .not_found
                .unwrap_or_else(|| boxed(|_req: Request| async { response::not_found() })),
        }
    }
}

/// Concurrency-safe route table.
pub struct Router {
    tree: RwLock<Node>,
    policy: RegistrationPolicy,
    methods: Vec<Method>,
    middleware: Middlewares,
    not_found: BoxHandler,
}

impl Router {
    /// Strict router with the default method set and no middleware.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder {
            policy: RegistrationPolicy::default(),
            methods: DEFAULT_METHODS.to_vec(),
            middleware: Middlewares::new(),
            not_found: None,
        }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    pub fn supported_methods(&self) -> &[Method] {
        &self.methods
    }

    /// Register `handler` for a raw method string.
    pub fn register(&self, method: &str, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        let method = parse_method(method)?;
        self.route(method, pattern, handler)
    }

    /// Register `handler` for `method`.
    pub fn route(&self, method: Method, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        validate_pattern(pattern)?;
        self.insert_all(&[method], pattern, boxed(handler))
    }

    pub fn get(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn head(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::HEAD, pattern, handler)
    }

    pub fn options(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::OPTIONS, pattern, handler)
    }

    pub fn patch(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.route(Method::PATCH, pattern, handler)
    }

    /// Register `handler` for every supported method at once.
    pub fn any(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        validate_pattern(pattern)?;
        self.insert_all(&self.methods, pattern, boxed(handler))
    }

    /// Method-agnostic registration; same as [`Router::any`].
    pub fn handle(&self, pattern: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.any(pattern, handler)
    }

    fn insert_all(&self, methods: &[Method], pattern: &str, handler: BoxHandler) -> Result<(), RouteError> {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);

        if self.policy == RegistrationPolicy::Strict {
            if let Some(existing) = methods.iter().find_map(|m| tree.find(m.as_str(), pattern)) {
                return Err(RouteError::DuplicateRegistration {
                    method: existing.method().to_string(),
                    pattern: pattern.to_owned(),
                });
            }
        }

        for method in methods {
            let route = Route::new(method.clone(), pattern, handler.clone());
            match tree.insert(method.as_str(), pattern, route) {
                Some(previous) => tracing::debug!(
                    method = %method,
                    pattern,
                    previous = previous.pattern(),
                    "Route replaced"
                ),
                None => tracing::debug!(method = %method, pattern, "Route registered"),
            }
        }
        Ok(())
    }

    /// Look up (method, path) without invoking anything.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.search(method.as_str(), path).map(|m| RouteMatch {
            method: method.clone(),
            pattern: m.route.pattern().to_owned(),
            handler: m.route.handler().clone(),
            params: m.params,
        })
    }

    /// The route `req` would be dispatched to.
    pub fn resolve(&self, req: &Request) -> Option<RouteMatch> {
        self.lookup(req.method(), req.uri().path())
    }

    /// Route `req` and run the handler through the middleware chain.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let start = Instant::now();
        let method = req.method().clone();

        let (handler, pattern) = match self.resolve(&req) {
            Some(matched) => {
                req.extensions_mut().insert(matched.params);
                req.extensions_mut()
                    .insert(MatchedPattern(matched.pattern.clone()));
                (matched.handler, Some(matched.pattern))
            }
            None => {
                tracing::debug!(method = %method, path = %req.uri().path(), "No route matched");
                (self.not_found.clone(), None)
            }
        };

        let res = self.middleware.handle(handler).call(req).await;
        metrics::record_request(
            method.as_str(),
            res.status().as_u16(),
            pattern.as_deref().unwrap_or("none"),
            start,
        );
        res
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("policy", &self.policy)
            .field("methods", &self.methods)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

fn parse_method(method: &str) -> Result<Method, RouteError> {
    if method.is_empty() {
        return Err(RouteError::invalid("method must not be empty"));
    }
    Method::from_bytes(method.as_bytes())
        .map_err(|_| RouteError::invalid(format!("invalid method {method:?}")))
}

fn validate_pattern(pattern: &str) -> Result<(), RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::invalid(format!(
            "pattern must begin with '/': {pattern:?}"
        )));
    }
    if let Some(segment) = segments(pattern).find(|s| wildcard_key(s) == Some("")) {
        return Err(RouteError::invalid(format!(
            "wildcard segment {segment:?} in {pattern:?} has no name"
        )));
    }
    Ok(())
}
