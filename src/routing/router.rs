//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted by prefix length, longest first
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Explicit None rather than silent default

use crate::config::DevServerConfig;
use crate::routing::route::ProxyRoute;
use crate::routing::RouteError;

/// Immutable table of compiled proxy routes.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    routes: Vec<ProxyRoute>,
}

impl ProxyTable {
    /// Compile every proxy rule in the configuration.
    pub fn from_config(config: &DevServerConfig) -> Result<Self, RouteError> {
        let mut routes = config
            .proxy
            .iter()
            .map(|(prefix, rule)| ProxyRoute::compile(prefix, rule, &config.timeouts))
            .collect::<Result<Vec<_>, _>>()?;

        routes.sort_by(|a, b| b.matcher().specificity().cmp(&a.matcher().specificity()));

        for route in &routes {
            tracing::debug!(
                prefix = %route.prefix(),
                target = %route.target(),
                change_origin = route.change_origin(),
                "Proxy route compiled"
            );
        }

        Ok(Self { routes })
    }

    /// Find the most specific route whose prefix matches `path`.
    pub fn match_path(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|r| r.matcher().matches(path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &ProxyRoute> {
        self.routes.iter()
    }
}
