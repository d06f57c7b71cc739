//! Command executor wire types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Where a remote command executor listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint, rejecting an empty host or port 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::InvalidEndpoint("empty host".to_string()));
        }
        if port == 0 {
            return Err(Error::InvalidEndpoint(format!("{host}:0 has no port")));
        }
        Ok(Self { host, port })
    }

    /// Parse `host:port`.
    pub fn parse(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidEndpoint(format!("expected host:port, got '{s}'")))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::InvalidEndpoint(format!("bad port in '{s}': {e}")))?;
        Self::new(host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests, without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = &self.host;
        let port = self.port;
        format!("http://{host}:{port}")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = &self.host;
        let port = self.port;
        write!(f, "{host}:{port}")
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Body posted to `{base_url}/execute`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandRequest {
    /// A named command handled by the remote plugin.
    Command {
        #[serde(rename = "type")]
        command: String,
        params: Map<String, Value>,
    },
    /// Raw script text run by the remote interpreter.
    Code { code: String },
}

impl CommandRequest {
    pub fn command(name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self::Command {
            command: name.into(),
            params,
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self::Code { code: code.into() }
    }

    /// Name used in logs and stub lookups.
    pub fn name(&self) -> &str {
        match self {
            Self::Command { command, .. } => command,
            Self::Code { .. } => "execute_code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_endpoint() {
        let endpoint = Endpoint::parse("localhost:8400").unwrap();
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.port(), 8400);
        assert_eq!(endpoint.base_url(), "http://localhost:8400");
        assert_eq!(endpoint.to_string(), "localhost:8400");
    }

    #[test]
    fn reject_bad_endpoints() {
        assert!(Endpoint::parse("localhost").is_err());
        assert!(Endpoint::parse("localhost:http").is_err());
        assert!(Endpoint::parse(":8400").is_err());
        assert!(Endpoint::parse("localhost:0").is_err());
        assert!(Endpoint::parse("localhost:70000").is_err());
    }

    #[test]
    fn serialize_typed_command() {
        let mut params = Map::new();
        params.insert("object_name".into(), json!("Cube"));
        let req = CommandRequest::command("get_object_info", params);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"type": "get_object_info", "params": {"object_name": "Cube"}})
        );
        assert_eq!(req.name(), "get_object_info");
    }

    #[test]
    fn serialize_code_command() {
        let req = CommandRequest::code("print(1)");
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"code": "print(1)"}));
        assert_eq!(req.name(), "execute_code");
    }
}
