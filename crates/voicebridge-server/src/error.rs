//! Axum-specific error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced across the HTTP/WebSocket boundary.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The referenced session id doesn't exist (or has already closed).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed (bad query params, bad body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Something failed that isn't the caller's fault.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody { error: self.to_string(), status: status.as_u16() };
        (status, Json(body)).into_response()
    }
}
