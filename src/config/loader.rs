//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::overrides::ConfigOverrides;
use crate::config::schema::DevServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DevServerConfig, ConfigError> {
    load_config_with(path, &ConfigOverrides::default())
}

/// Load a TOML file, apply `overrides`, then validate the result.
pub fn load_config_with(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<DevServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: DevServerConfig = toml::from_str(&content)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DevServerConfig, ConfigError> {
    let config: DevServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_is_reported() {
        let err = parse_config("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = parse_config("port = 0\nhost = \"nowhere\"").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("port must be non-zero"));
        assert!(message.contains("host 'nowhere' is not an IP address"));
    }

    #[test]
    fn overrides_apply_before_validation() {
        let path = std::env::temp_dir().join(format!(
            "dev-proxy-loader-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "port = 0\n").unwrap();

        assert!(matches!(
            load_config(&path).unwrap_err(),
            ConfigError::Validation(_)
        ));

        let overrides = ConfigOverrides {
            port: Some(4100),
            ..ConfigOverrides::default()
        };
        let config = load_config_with(&path, &overrides).unwrap();
        assert_eq!(config.port, 4100);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/dev-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
