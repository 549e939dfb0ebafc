//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing::ProxyTable (prefix lookup)
//!         hit  → forward.rs (upstream call, streamed response)
//!         miss → assets.rs (static files, history fallback)
//!     → response.rs (local error bodies)
//!     → Send to client
//! ```

pub mod assets;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::ProxyError;
pub use request::X_REQUEST_ID;
pub use server::DevServer;
