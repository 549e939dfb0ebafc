//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.
//!
//! Proxy rule keys accept both the camelCase spelling used by frontend
//! tooling (`changeOrigin`, `pathRewrite`) and snake_case aliases.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DevServerConfig {
    /// Listen interface (e.g., "127.0.0.1").
    pub host: String,

    /// Local listen port.
    pub port: u16,

    /// Proxy rules keyed by request path prefix.
    pub proxy: BTreeMap<String, ProxyRule>,

    /// Directory of frontend assets served for non-proxied paths.
    pub static_dir: Option<PathBuf>,

    /// Serve `index.html` for HTML navigations that have no file on disk.
    pub history_api_fallback: bool,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub limits: LimitsConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            proxy: BTreeMap::new(),
            static_dir: None,
            history_api_fallback: true,
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl DevServerConfig {
    /// The `host:port` pair the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A single proxy rule: where to send requests under a prefix.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProxyRule {
    /// Upstream origin, e.g. "https://api.example.com".
    pub target: String,

    /// Rewrite the Host header to the target authority.
    #[serde(default, rename = "changeOrigin", alias = "change_origin")]
    pub change_origin: bool,

    /// Path prefix replacements applied before forwarding.
    #[serde(default, rename = "pathRewrite", alias = "path_rewrite")]
    pub path_rewrite: BTreeMap<String, String>,

    /// Verify the upstream TLS certificate.
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Add X-Forwarded-* headers.
    #[serde(default)]
    pub xfwd: bool,

    /// Extra headers set on every upstream request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_secure() -> bool {
    true
}

impl ProxyRule {
    /// A rule forwarding to `target` with every option at its default.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            change_origin: false,
            path_rewrite: BTreeMap::new(),
            secure: true,
            xfwd: false,
            headers: BTreeMap::new(),
        }
    }

    /// Builder-style setter for `changeOrigin`.
    pub fn with_change_origin(mut self, change_origin: bool) -> Self {
        self.change_origin = change_origin;
        self
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}
