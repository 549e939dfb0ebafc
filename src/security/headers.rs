//! Header manipulation for proxied requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Rewrite Host to the target authority when the route changes origin
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host (opt-in)
//! - Apply per-route extra headers
//!
//! # Design Decisions
//! - Headers named by `Connection` are treated as hop-by-hop too
//! - Extra headers are applied last and override incoming values

use std::net::IpAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::routing::ProxyRoute;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Headers that apply to a single transport hop only.
pub const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Build the header set sent to the upstream for `route`.
pub fn upstream_request_headers(
    incoming: &HeaderMap,
    route: &ProxyRoute,
    client_ip: Option<IpAddr>,
) -> HeaderMap {
    let mut headers = incoming.clone();
    strip_hop_by_hop(&mut headers);

    let original_host = incoming.get(header::HOST).cloned();

    if route.change_origin() {
        if let Ok(authority) = HeaderValue::from_str(&route.target_authority()) {
            headers.insert(header::HOST, authority);
        }
    }

    if route.xfwd() {
        if let Some(ip) = client_ip {
            let forwarded_for = match incoming.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
                Some(existing) => format!("{existing}, {ip}"),
                None => ip.to_string(),
            };
            if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
                headers.insert(X_FORWARDED_FOR, value);
            }
        }
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host);
        }
    }

    for (name, value) in route.extra_headers() {
        headers.insert(name.clone(), value.clone());
    }

    headers
}

/// Build the header set returned to the client from an upstream response.
pub fn downstream_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    strip_hop_by_hop(&mut headers);
    headers
}
