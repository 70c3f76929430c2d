//! Registration errors.

use thiserror::Error;

/// Errors raised while registering routes.
///
/// Both variants are startup failures: a router that rejected a route is
/// misconfigured and should not start serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Method, pattern or wildcard name is malformed.
    #[error("invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    /// The (method, pattern) pair is already bound and the router is strict.
    #[error("route already registered: {method} {pattern}")]
    DuplicateRegistration { method: String, pattern: String },
}

impl RouteError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RouteError::InvalidRegistration {
            reason: reason.into(),
        }
    }
}
