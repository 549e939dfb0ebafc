//! Compiled proxy route.

use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::{ProxyRule, TimeoutConfig};
use crate::routing::matcher::{PathPrefixMatcher, PathRewrite};
use crate::routing::RouteError;

/// A proxy rule compiled for the request path.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    matcher: PathPrefixMatcher,
    target: Url,
    change_origin: bool,
    xfwd: bool,
    rewrite: PathRewrite,
    extra_headers: HeaderMap,
    client: reqwest::Client,
}

impl ProxyRoute {
    /// Compile a rule. Builds the upstream client for this route.
    pub fn compile(prefix: &str, rule: &ProxyRule, timeouts: &TimeoutConfig) -> Result<Self, RouteError> {
        let target = Url::parse(&rule.target).map_err(|e| RouteError::InvalidTarget {
            prefix: prefix.to_string(),
            reason: e.to_string(),
        })?;
        if target.host_str().is_none() {
            return Err(RouteError::InvalidTarget {
                prefix: prefix.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let mut extra_headers = HeaderMap::new();
        for (name, value) in &rule.headers {
            let invalid = || RouteError::InvalidHeader {
                prefix: prefix.to_string(),
                name: name.clone(),
            };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            extra_headers.insert(name, value);
        }

        // Redirects are handed back to the browser untouched.
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .danger_accept_invalid_certs(!rule.secure)
            .build()
            .map_err(RouteError::Client)?;

        Ok(Self {
            matcher: PathPrefixMatcher::new(prefix),
            target,
            change_origin: rule.change_origin,
            xfwd: rule.xfwd,
            rewrite: PathRewrite::new(&rule.path_rewrite),
            extra_headers,
            client,
        })
    }

    /// The configured path prefix, used as the route name in logs and metrics.
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn matcher(&self) -> &PathPrefixMatcher {
        &self.matcher
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn change_origin(&self) -> bool {
        self.change_origin
    }

    pub fn xfwd(&self) -> bool {
        self.xfwd
    }

    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// `host[:port]` of the target, the port omitted when it is the scheme default.
    pub fn target_authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Apply configured path rewrites.
    pub fn rewrite_path(&self, path: &str) -> String {
        self.rewrite.apply(path)
    }

    /// Build the upstream URL: target origin, target base path, rewritten
    /// request path and the request query.
    ///
    /// The query passes through `Url::set_query`, which percent-encodes
    /// bytes outside the URL query set (`o'brien` becomes `o%27brien`).
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Url {
        let rewritten = self.rewrite_path(path);
        let base = self.target.path().trim_end_matches('/');

        let mut url = self.target.clone();
        url.set_path(&format!("{base}{rewritten}"));
        url.set_query(query);
        url
    }
}
