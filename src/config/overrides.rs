//! Command-line overrides layered over the configuration file.
//!
//! Overrides are applied on every load, including hot reloads, so a
//! reloaded file never appears to change settings the command line pinned.

use std::path::PathBuf;

use crate::config::schema::DevServerConfig;

/// Settings pinned from outside the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Overwrite the fields of `config` that are pinned here.
    pub fn apply(&self, config: &mut DevServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = Some(dir.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.port.is_none() && self.host.is_none() && self.static_dir.is_none()
    }
}
