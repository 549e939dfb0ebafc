//! Error responses produced by the dev server itself.
//!
//! Proxied responses pass through untouched; only local failures
//! (no route, missing asset, upstream down) are rendered here as
//! `{"error": ..., "message": ...}` JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// JSON error response; `error` is the canonical reason phrase of `status`.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}
