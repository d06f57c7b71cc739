//! Typed relay configuration.

use std::time::Duration;

use bridge::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_EXECUTE_TIMEOUT, Endpoint};
use serde::{Deserialize, Serialize};

use crate::connection::RetryPolicy;
use crate::error::{Error, Result};

pub const DEFAULT_MODELING_PORT: u16 = 8400;
pub const DEFAULT_EXTENDED_MODELING_PORT: u16 = 8401;
pub const DEFAULT_ENGINE_PORT: u16 = 8500;

fn default_host() -> String {
    "localhost".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub modeling: ModelingConfig,
    pub engine: EngineConfig,
    pub connection: ConnectionConfig,
}

/// The modeling tool's add-on server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelingConfig {
    pub host: String,
    /// Defaults to 8400, or 8401 when `extended` is set.
    pub port: Option<u16>,
    /// Expect the extended add-on.
    pub extended: bool,
    pub verify_on_use: bool,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            extended: false,
            verify_on_use: false,
        }
    }
}

impl ModelingConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.extended {
            DEFAULT_EXTENDED_MODELING_PORT
        } else {
            DEFAULT_MODELING_PORT
        })
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(self.host.clone(), self.port())
            .map_err(|e| Error::Config(format!("modeling endpoint: {e}")))
    }
}

/// The engine editor's Python server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub verify_on_use: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_ENGINE_PORT,
            verify_on_use: false,
        }
    }
}

impl EngineConfig {
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(self.host.clone(), self.port)
            .map_err(|e| Error::Config(format!("engine endpoint: {e}")))
    }
}

/// Retry and timeout settings shared by both services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub connect_timeout_secs: u64,
    pub execute_timeout_secs: u64,
    pub stub_recheck_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_backoff_ms: 1000,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            execute_timeout_secs: DEFAULT_EXECUTE_TIMEOUT.as_secs(),
            stub_recheck_secs: 30,
        }
    }
}

impl ConnectionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn execute_timeout(&self) -> Duration {
        Duration::from_secs(self.execute_timeout_secs)
    }

    pub fn stub_recheck(&self) -> Duration {
        Duration::from_secs(self.stub_recheck_secs)
    }
}

impl RelayConfig {
    /// Check everything that would otherwise fail at first use.
    pub fn validate(&self) -> Result<()> {
        self.modeling.endpoint()?;
        self.engine.endpoint()?;

        let connection = &self.connection;
        if connection.retry_attempts == 0 {
            return Err(Error::Config("connection.retry_attempts must be at least 1".into()));
        }
        if connection.connect_timeout_secs == 0 || connection.execute_timeout_secs == 0 {
            return Err(Error::Config("connection timeouts must be at least 1 second".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ports() {
        let config = RelayConfig::default();
        assert_eq!(config.modeling.port(), 8400);
        assert_eq!(config.engine.port, 8500);
        assert_eq!(config.connection.retry_policy(), RetryPolicy::default());
        assert_eq!(config.connection.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.connection.execute_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn extended_switches_default_port() {
        let config: RelayConfig = serde_json::from_value(serde_json::json!({
            "modeling": {"extended": true}
        }))
        .unwrap();
        assert_eq!(config.modeling.port(), 8401);
        assert_eq!(config.modeling.host, "localhost");

        let config: RelayConfig = serde_json::from_value(serde_json::json!({
            "modeling": {"extended": true, "port": 9876}
        }))
        .unwrap();
        assert_eq!(config.modeling.port(), 9876);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = RelayConfig::default();
        config.engine.host.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = RelayConfig::default();
        config.modeling.port = Some(0);
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.connection.retry_attempts = 0;
        assert!(config.validate().is_err());
    }
}
