//! HTTP transport for the remote command executors.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{CommandRequest, Endpoint};
use crate::transport::Transport;

/// Timeout for the liveness check issued by `connect`.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for command execution.
/// Sized for scripts run inside the remote application, which can be slow.
pub const DEFAULT_EXECUTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the command endpoint.
const EXECUTE_PATH: &str = "/execute";

/// Configuration for an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: Endpoint,
    /// Liveness path (`/ping` for the modeling add-on, `/status` for the editor plugin).
    pub liveness_path: String,
    pub connect_timeout: Duration,
    pub execute_timeout: Duration,
}

impl TransportConfig {
    pub fn new(endpoint: Endpoint, liveness_path: impl Into<String>) -> Self {
        Self {
            endpoint,
            liveness_path: liveness_path.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            execute_timeout: DEFAULT_EXECUTE_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, execute: Duration) -> Self {
        self.connect_timeout = connect;
        self.execute_timeout = execute;
        self
    }
}

/// Transport that posts command envelopes over HTTP.
pub struct HttpTransport {
    config: TransportConfig,
    client: Option<reqwest::Client>,
    last_error: Option<String>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: None,
            last_error: None,
        }
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.endpoint.base_url();
        format!("{base}{path}")
    }

    fn record(&mut self, err: &Error) {
        self.last_error = Some(err.to_string());
    }

    async fn liveness(&self, client: &reqwest::Client) -> Result<()> {
        let timeout = self.config.connect_timeout;
        let response = client
            .get(self.url(&self.config.liveness_path))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn post(&self, client: &reqwest::Client, request: &CommandRequest) -> Result<Value> {
        let timeout = self.config.execute_timeout;
        let response = client
            .post(self.url(EXECUTE_PATH))
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

impl Transport for HttpTransport {
    async fn connect(&mut self) -> bool {
        self.close();

        let client = match reqwest::Client::builder().build() {
            Ok(client) => client,
            Err(e) => {
                let err = Error::Client(e.to_string());
                warn!(endpoint = %self.config.endpoint, error = %err, "failed to build HTTP client");
                self.record(&err);
                return false;
            }
        };

        match self.liveness(&client).await {
            Ok(()) => {
                info!(endpoint = %self.config.endpoint, "connected");
                self.client = Some(client);
                self.last_error = None;
                true
            }
            Err(err) => {
                warn!(endpoint = %self.config.endpoint, error = %err, "connect failed");
                self.record(&err);
                false
            }
        }
    }

    async fn ping(&mut self) -> Result<()> {
        let client = self.client.clone().ok_or(Error::NotConnected)?;
        let result = self.liveness(&client).await;
        if let Err(err) = &result {
            self.record(err);
        }
        result
    }

    async fn execute(&mut self, request: &CommandRequest) -> Result<Value> {
        if self.client.is_none() && !self.connect().await {
            return Err(Error::NotConnected);
        }
        let client = self.client.clone().ok_or(Error::NotConnected)?;

        debug!(endpoint = %self.config.endpoint, command = request.name(), "executing");
        let result = self.post(&client, request).await;
        if let Err(err) = &result {
            warn!(
                endpoint = %self.config.endpoint,
                command = request.name(),
                error = %err,
                "command failed"
            );
            self.record(err);
        }
        result
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            info!(endpoint = %self.config.endpoint, "connection closed");
        }
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }
}
