//! dev-proxy
//!
//! A frontend development server that forwards API calls to a backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  DEV PROXY                   │
//!   Browser request     │  ┌──────────┐   ┌────────┐   ┌────────────┐  │
//!   ────────────────────┼─▶│ listener │──▶│  http  │──▶│  routing   │  │
//!                       │  └──────────┘   │ server │   │ ProxyTable │  │
//!                       │                 └────────┘   └─────┬──────┘  │
//!                       │                                    │         │
//!                       │                  prefix hit ◀──────┴─▶ miss  │
//!                       │                      │                 │     │
//!                       │               ┌──────▼─────┐   ┌───────▼───┐ │
//!                       │               │  forward   │   │  assets   │ │
//!                       │               │ + headers  │   │ (history) │ │
//!                       │               └──────┬─────┘   └───────────┘ │
//!                       └──────────────────────┼───────────────────────┘
//!                                              ▼
//!                                        backend target
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::sync::mpsc;

use dev_proxy::config::{
    load_config_with, validate_config, ConfigError, ConfigOverrides, DevServerConfig,
};
use dev_proxy::config::watcher::ConfigWatcher;
use dev_proxy::lifecycle::signals::spawn_signal_handler;
use dev_proxy::lifecycle::Shutdown;
use dev_proxy::observability::{logging, metrics};
use dev_proxy::{net, DevServer};

const DEFAULT_CONFIG: &str = "dev-proxy.toml";

#[derive(Parser, Debug)]
#[command(name = "dev-proxy")]
#[command(about = "Frontend dev server with API proxying", long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Serve frontend assets from this directory.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Reload proxy rules when the configuration file changes.
    #[arg(short, long)]
    watch: bool,

    /// Validate the configuration, print it and exit.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            host: self.host.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    let (config, from_file) = read_config(&cli.config, &overrides)?;

    if cli.check {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    logging::init(&config.observability)?;
    tracing::info!("dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    if !from_file {
        tracing::warn!(path = ?cli.config, "Config file not found, using defaults");
    }

    for (prefix, rule) in &config.proxy {
        tracing::info!(
            prefix = %prefix,
            target = %rule.target,
            change_origin = rule.change_origin,
            "Proxy rule"
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = net::bind(&config).await?;

    // The watcher handle must outlive the server.
    let (config_updates, _watcher) = if cli.watch && from_file {
        let (watcher, updates) = ConfigWatcher::new(&cli.config);
        (updates, Some(watcher.with_overrides(overrides).run()?))
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (updates, None)
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = DevServer::new(config)?;
    server
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load `path` with `overrides`; a missing default file falls back to
/// built-in defaults.
fn read_config(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<(DevServerConfig, bool), ConfigError> {
    match load_config_with(path, overrides) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::Io(e))
            if e.kind() == std::io::ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG) =>
        {
            let mut config = DevServerConfig::default();
            overrides.apply(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok((config, false))
        }
        Err(e) => Err(e),
    }
}
