//! TCP listener setup.
//!
//! # Responsibilities
//! - Parse the configured host and port
//! - Bind the listening socket
//! - Report bind failures (port in use, bad address) distinctly

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::DevServerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured host is not an IP address.
    #[error("Invalid listen host '{0}'")]
    InvalidHost(String),

    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the listener for `config.host:config.port`.
pub async fn bind(config: &DevServerConfig) -> Result<TcpListener, ListenerError> {
    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|_| ListenerError::InvalidHost(config.host.clone()))?;
    let addr = SocketAddr::new(ip, config.port);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }

    Ok(listener)
}
