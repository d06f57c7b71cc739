//! Configuration loading from ub-relay.toml.

use std::path::Path;

use bridge::Endpoint;
use relay::RelayConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    /// Service endpoints, retries and timeouts.
    #[serde(flatten)]
    pub relay: RelayConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Values given on the command line; each one wins over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub modeling: Option<String>,
    pub engine: Option<String>,
    pub extended: bool,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if overrides.extended {
            self.relay.modeling.extended = true;
        }
        if let Some(modeling) = overrides.modeling {
            let endpoint = parse_endpoint("--modeling", &modeling)?;
            self.relay.modeling.host = endpoint.host().to_string();
            self.relay.modeling.port = Some(endpoint.port());
        }
        if let Some(engine) = overrides.engine {
            let endpoint = parse_endpoint("--engine", &engine)?;
            self.relay.engine.host = endpoint.host().to_string();
            self.relay.engine.port = endpoint.port();
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        Ok(())
    }
}

fn parse_endpoint(flag: &str, value: &str) -> Result<Endpoint, ConfigError> {
    Endpoint::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        flag: flag.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid {flag} endpoint: {reason}")]
    InvalidEndpoint { flag: String, reason: String },
}
