//! Extended-capability detection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::protocol::CommandRequest;
use crate::transport::Transport;

/// Canonical command whose reply reveals the add-on flavour.
pub const PROBE_COMMAND: &str = "get_version_info";

/// Field present only in replies from the extended add-on.
pub const EXTENDED_MARKER: &str = "extended_version";

/// What a connected remote service supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Baseline command set only.
    #[default]
    Baseline,
    /// Baseline plus the extended command set.
    Extended,
}

impl Capability {
    pub fn is_extended(self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// Classifies a live connection by issuing one probe command.
#[derive(Debug, Clone)]
pub struct CapabilityProbe {
    command: String,
    marker: String,
}

impl Default for CapabilityProbe {
    fn default() -> Self {
        Self::new(PROBE_COMMAND, EXTENDED_MARKER)
    }
}

impl CapabilityProbe {
    pub fn new(command: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            marker: marker.into(),
        }
    }

    /// Inspect a probe reply.
    ///
    /// The marker may sit at the top level or inside a `result` object,
    /// depending on whether the remote wraps its payloads.
    pub fn classify(&self, response: &Value) -> Capability {
        if self.marker_value(response).is_some() {
            Capability::Extended
        } else {
            Capability::Baseline
        }
    }

    /// Extended add-on version advertised in a probe reply.
    pub fn version(&self, response: &Value) -> Option<String> {
        self.marker_value(response).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn marker_value<'a>(&self, response: &'a Value) -> Option<&'a Value> {
        response.get(&self.marker).or_else(|| {
            response
                .get("result")
                .and_then(|result| result.get(&self.marker))
        })
    }

    /// Run the probe. Any failure counts as baseline.
    pub async fn probe<T: Transport>(&self, transport: &mut T) -> Capability {
        let request = CommandRequest::command(self.command.clone(), Map::new());
        match transport.execute(&request).await {
            Ok(response) => {
                let capability = self.classify(&response);
                match self.version(&response) {
                    Some(version) => info!(
                        endpoint = %transport.endpoint(),
                        version = %version,
                        "extended add-on detected"
                    ),
                    None => info!(endpoint = %transport.endpoint(), "baseline add-on detected"),
                }
                capability
            }
            Err(err) => {
                debug!(endpoint = %transport.endpoint(), error = %err, "capability probe failed");
                Capability::Baseline
            }
        }
    }
}
