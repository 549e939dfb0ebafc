//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URL and headers for a matched route
//! - Send the request through the route's client
//! - Stream the upstream response back to the client
//! - Reject dot-segment paths and oversized bodies before sending
//! - Map transport failures to 502/504
//!
//! # Design Decisions
//! - Request bodies are buffered up to the configured limit; response
//!   bodies are streamed
//! - Redirects are never followed; the browser sees them as-is

use std::error::Error as _;
use std::net::IpAddr;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use thiserror::Error;

use crate::http::response::error_response;
use crate::routing::matcher::has_dot_segments;
use crate::routing::ProxyRoute;
use crate::security::headers::{downstream_response_headers, upstream_request_headers};

/// Failure while proxying a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("path {path} contains dot segments")]
    InvalidPath { path: String },

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("upstream {url} timed out")]
    Timeout { url: String },

    #[error("upstream {url} request failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Response(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string())
    }
}

/// Forward `request` to `route`'s target and return the upstream response.
pub async fn forward(
    route: &ProxyRoute,
    request: Request<Body>,
    client_ip: Option<IpAddr>,
    max_body_size: usize,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    if has_dot_segments(parts.uri.path()) {
        return Err(ProxyError::InvalidPath {
            path: parts.uri.path().to_string(),
        });
    }

    let url = route.upstream_url(parts.uri.path(), parts.uri.query());
    let headers = upstream_request_headers(&parts.headers, route, client_ip);

    let mut upstream = route
        .client()
        .request(parts.method.clone(), url.clone())
        .headers(headers);

    if declares_body(&parts.headers) {
        let bytes = axum::body::to_bytes(body, max_body_size)
            .await
            .map_err(|e| {
                if exceeds_length_limit(&e) {
                    ProxyError::PayloadTooLarge {
                        limit: max_body_size,
                    }
                } else {
                    ProxyError::RequestBody(e)
                }
            })?;
        upstream = upstream.body(bytes);
    }

    tracing::debug!(
        route = %route.prefix(),
        method = %parts.method,
        upstream = %url,
        "Forwarding request"
    );

    let upstream_response = upstream.send().await.map_err(|source| {
        if source.is_timeout() {
            ProxyError::Timeout {
                url: url.to_string(),
            }
        } else {
            ProxyError::Upstream {
                url: url.to_string(),
                source,
            }
        }
    })?;

    let status = upstream_response.status();
    let headers = downstream_response_headers(upstream_response.headers());

    let mut response = Response::builder()
        .status(status)
        .body(Body::from_stream(upstream_response.bytes_stream()))?;
    *response.headers_mut() = headers;

    Ok(response)
}

/// HTTP/1.1 requests without Content-Length or Transfer-Encoding carry no body.
fn declares_body(headers: &HeaderMap) -> bool {
    headers.contains_key(header::CONTENT_LENGTH) || headers.contains_key(header::TRANSFER_ENCODING)
}

/// Body limit errors arrive wrapped, possibly more than once, in
/// `axum::Error`.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut current = err.source();
    while let Some(source) = current {
        if source.is::<LengthLimitError>() {
            return true;
        }
        current = source.source();
    }
    false
}
