//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate prefix)
//!     → Return: matched ProxyRoute or None
//!
//! Route Compilation (at startup and on reload):
//!     DevServerConfig.proxy
//!     → route.rs (parse target, build client, compile rewrites)
//!     → Sort by prefix length
//!     → Freeze as immutable ProxyTable
//! ```

pub mod matcher;
pub mod route;
pub mod router;

use thiserror::Error;

pub use route::ProxyRoute;
pub use router::ProxyTable;

/// Errors raised while compiling proxy routes.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("proxy '{prefix}': invalid target: {reason}")]
    InvalidTarget { prefix: String, reason: String },

    #[error("proxy '{prefix}': invalid header '{name}'")]
    InvalidHeader { prefix: String, name: String },

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}
