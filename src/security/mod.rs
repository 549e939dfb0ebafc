//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → headers.rs (strip hop-by-hop, rewrite Host, add X-Forwarded-*)
//!     → Forward to upstream
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//!     → Return to client
//! ```
//!
//! Request body size is capped by the HTTP layer (`limits.max_body_size`).

pub mod headers;
