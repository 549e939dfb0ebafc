//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate proxy targets (scheme, host, no query/fragment)
//! - Validate value ranges (timeouts > 0, port non-zero)
//! - Validate header names and values before they reach the hot path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::DevServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("port must be non-zero")]
    ZeroPort,

    #[error("host '{0}' is not an IP address")]
    InvalidHost(String),

    #[error("proxy prefix '{0}' must start with '/'")]
    InvalidPrefix(String),

    #[error("proxy '{prefix}': invalid target '{target}': {reason}")]
    InvalidTarget {
        prefix: String,
        target: String,
        reason: String,
    },

    #[error("proxy '{prefix}': pathRewrite key '{key}' must start with '/'")]
    InvalidRewrite { prefix: String, key: String },

    #[error("proxy '{prefix}': invalid header '{name}'")]
    InvalidHeader { prefix: String, name: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("static_dir must not be empty")]
    EmptyStaticDir,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &DevServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidHost(config.host.clone()));
    }

    for (prefix, rule) in &config.proxy {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix(prefix.clone()));
        }

        if let Err(reason) = check_target(&rule.target) {
            errors.push(ValidationError::InvalidTarget {
                prefix: prefix.clone(),
                target: rule.target.clone(),
                reason,
            });
        }

        for key in rule.path_rewrite.keys() {
            if !key.trim_start_matches('^').starts_with('/') {
                errors.push(ValidationError::InvalidRewrite {
                    prefix: prefix.clone(),
                    key: key.clone(),
                });
            }
        }

        for (name, value) in &rule.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                errors.push(ValidationError::InvalidHeader {
                    prefix: prefix.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if let Some(dir) = &config.static_dir {
        if dir.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyStaticDir);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_target(target: &str) -> Result<(), String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}
