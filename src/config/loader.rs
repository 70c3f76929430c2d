//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ServerConfig = toml::from_str(&content)?;
    config.apply_env();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn from_env() -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();
    config.apply_env();
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

impl ServerConfig {
    /// Apply `APP_ENV` and `PORT` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("APP_ENV").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
        );
    }

    /// Apply explicit `APP_ENV` / `PORT` values.
    ///
    /// `PORT` replaces only the port of the bind address. Empty values are
    /// ignored; an unknown environment is logged and ignored.
    pub fn apply_overrides(&mut self, app_env: Option<&str>, port: Option<&str>) {
        if let Some(value) = app_env.filter(|v| !v.is_empty()) {
            match Environment::parse(value) {
                Some(env) => self.env = env,
                None => tracing::warn!(app_env = value, "Unknown APP_ENV, keeping configured environment"),
            }
        }

        if let Some(port) = port.filter(|p| !p.is_empty()) {
            let host = self
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.listener.bind_address = format!("{host}:{port}");
        }
    }
}
