//! Frontend development server with path-prefix API proxying.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::DevServerConfig;
pub use http::DevServer;
pub use lifecycle::Shutdown;
