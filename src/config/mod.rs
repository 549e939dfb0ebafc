//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! dev-proxy.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DevServerConfig (validated, immutable)
//!     → compiled into a ProxyTable by the routing subsystem
//!
//! On file change (when --watch is set):
//!     watcher.rs detects change
//!     → loader.rs loads new config, re-applying CLI overrides
//!     → validation.rs validates
//!     → sent to the server, which swaps its ProxyTable
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only proxy rules are hot-reloaded; listener settings need a restart

pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_with, parse_config, ConfigError};
pub use overrides::ConfigOverrides;
pub use schema::{DevServerConfig, LimitsConfig, ObservabilityConfig, ProxyRule, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
