//! Fixed responses.
//!
//! The router's default not-found fallback, the recovery middleware's error
//! response and the health-check responder.

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::http::handler::{Request, Response};

/// `404 Not Found`, the default fallback for unmatched requests.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// `500 Internal Server Error`.
pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Liveness probe: always `200 OK`.
pub async fn healthcheck(_req: Request) -> Response {
    (StatusCode::OK, "OK").into_response()
}
