//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to its defaults so a minimal (or absent) file
//! still yields a runnable server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::RegistrationPolicy;

/// Deployment environment (`APP_ENV`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Stg,
    Prd,
}

impl Environment {
    /// Parse an `APP_ENV` value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" => Some(Environment::Dev),
            "stg" => Some(Environment::Stg),
            "prd" => Some(Environment::Prd),
            _ => None,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Deployment environment.
    pub env: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route table settings.
    pub routing: RoutingConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    pub fn is_dev(&self) -> bool {
        self.env == Environment::Dev
    }

    pub fn is_stg(&self) -> bool {
        self.env == Environment::Stg
    }

    pub fn is_prd(&self) -> bool {
        self.env == Environment::Prd
    }

    /// Effective log level: the configured one, else debug in dev and info
    /// everywhere else.
    pub fn log_level(&self) -> &str {
        match &self.observability.log_level {
            Some(level) => level.as_str(),
            None if self.is_dev() => "debug",
            None => "info",
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Duplicate registration policy (`strict` or `lenient`).
    pub policy: RegistrationPolicy,
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Drain deadline in seconds.
    pub timeout_secs: u64,

    /// Still drain when the serve loop fails on its own.
    pub drain_on_fault: bool,
}

impl ShutdownConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            drain_on_fault: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). Derived from the
    /// environment when unset.
    pub log_level: Option<String>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
