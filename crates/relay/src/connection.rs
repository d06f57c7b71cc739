//! Per-service connection lifecycle: connect, retry, probe, reconnect, stub.

use std::fmt;
use std::time::{Duration, Instant};

use bridge::{Capability, CapabilityProbe, CommandRequest, HttpTransport, Transport};
use catalog::ServiceKind;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::stub::StubResponder;

/// Where a connection manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    Connected,
    /// The last command hit a broken transport; the next call reconnects.
    Disconnected,
    /// Retries exhausted; read-only commands are answered by the stub.
    Stubbed,
    /// Retries exhausted and no stub configured.
    Unavailable,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Stubbed => "stubbed",
            Self::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Attempts and fixed backoff for the initial connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub service: ServiceKind,
    pub retry: RetryPolicy,
    /// Run once after every successful connect. `None` leaves the
    /// capability unknown.
    pub probe: Option<CapabilityProbe>,
    /// Answers read-only commands once retries are exhausted.
    pub stub: Option<StubResponder>,
    /// Ping a cached connection before every command.
    pub verify_on_use: bool,
    /// How long a stubbed or unavailable manager waits before dialing again.
    pub recheck_after: Duration,
}

impl ManagerConfig {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            retry: RetryPolicy::default(),
            probe: None,
            stub: None,
            verify_on_use: false,
            recheck_after: Duration::from_secs(30),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_probe(mut self, probe: CapabilityProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_stub(mut self, stub: StubResponder) -> Self {
        self.stub = Some(stub);
        self
    }

    pub fn verify_on_use(mut self, verify: bool) -> Self {
        self.verify_on_use = verify;
        self
    }

    pub fn recheck_after(mut self, delay: Duration) -> Self {
        self.recheck_after = delay;
        self
    }
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub service: ServiceKind,
    pub state: ConnectionState,
    pub connected: bool,
    /// Present only for services with a capability probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended: Option<bool>,
    pub endpoint: String,
    pub last_error: Option<String>,
}

struct Connection<T> {
    transport: T,
    state: ConnectionState,
    capability: Option<Capability>,
    gave_up_at: Option<Instant>,
}

/// Owns the single logical connection to one remote service.
///
/// All connection work happens under one async mutex, so concurrent callers
/// wait for an in-flight reconnect instead of starting their own, and the
/// transport never serves two requests at once. Status reads go through a
/// watch channel and never wait on that lock.
pub struct ConnectionManager<T = HttpTransport> {
    config: ManagerConfig,
    connection: Mutex<Connection<T>>,
    status: watch::Sender<ConnectionStatus>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, config: ManagerConfig) -> Self {
        let status = ConnectionStatus {
            service: config.service,
            state: ConnectionState::Uninitialized,
            connected: false,
            extended: config.probe.as_ref().map(|_| false),
            endpoint: transport.endpoint().to_string(),
            last_error: None,
        };
        Self {
            config,
            connection: Mutex::new(Connection {
                transport,
                state: ConnectionState::Uninitialized,
                capability: None,
                gave_up_at: None,
            }),
            status: watch::channel(status).0,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Capability of the current connection, if it has been probed.
    pub fn capability(&self) -> Option<Capability> {
        let status = self.status.borrow();
        match (status.connected, status.extended) {
            (true, Some(true)) => Some(Capability::Extended),
            (true, Some(false)) => Some(Capability::Baseline),
            _ => None,
        }
    }

    /// Make sure a live connection exists, connecting if needed.
    ///
    /// Returns immediately when already connected, unless `verify_on_use` is
    /// set, in which case the connection is pinged first.
    pub async fn ensure_connected(&self) -> bool {
        let mut conn = self.connection.lock().await;
        self.ensure(&mut conn, self.config.verify_on_use).await
    }

    /// Ping the connection and rebuild it if the ping fails.
    pub async fn check_health(&self) -> bool {
        let mut conn = self.connection.lock().await;
        self.ensure(&mut conn, true).await
    }

    /// Run one command against the service.
    ///
    /// Never panics or hangs past the transport timeouts. Fails with
    /// [`Error::ConnectionUnavailable`] when the service is unreachable.
    pub async fn execute(&self, request: &CommandRequest) -> Result<Value> {
        self.run(request, false).await
    }

    /// Like [`execute`](Self::execute), but a stubbed manager may answer
    /// with placeholder data instead of failing.
    pub async fn execute_read_only(&self, request: &CommandRequest) -> Result<Value> {
        self.run(request, true).await
    }

    async fn run(&self, request: &CommandRequest, read_only: bool) -> Result<Value> {
        let mut conn = self.connection.lock().await;
        if !self.ensure(&mut conn, self.config.verify_on_use).await {
            return self.fallback(&conn, request, read_only);
        }

        match conn.transport.execute(request).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                warn!(
                    service = %self.config.service,
                    command = request.name(),
                    error = %err,
                    "command failed"
                );
                if err.is_broken_transport() {
                    conn.transport.close();
                    self.set_state(&mut conn, ConnectionState::Disconnected);
                } else {
                    self.publish(&conn);
                }
                Err(Error::from_transport(self.config.service, err))
            }
        }
    }

    /// Close the connection. The next call reconnects.
    pub async fn disconnect(&self) {
        let mut conn = self.connection.lock().await;
        conn.transport.close();
        conn.gave_up_at = None;
        self.set_state(&mut conn, ConnectionState::Disconnected);
        debug!(service = %self.config.service, "disconnected");
    }

    async fn ensure(&self, conn: &mut Connection<T>, verify: bool) -> bool {
        match conn.state {
            ConnectionState::Connected if conn.transport.is_open() => {
                if !verify {
                    return true;
                }
                match conn.transport.ping().await {
                    Ok(()) => return true,
                    Err(err) => {
                        warn!(service = %self.config.service, error = %err, "liveness check failed, reconnecting");
                        conn.transport.close();
                        self.set_state(conn, ConnectionState::Disconnected);
                    }
                }
            }
            ConnectionState::Stubbed | ConnectionState::Unavailable => {
                let waiting = conn
                    .gave_up_at
                    .is_some_and(|at| at.elapsed() < self.config.recheck_after);
                if waiting {
                    return false;
                }
            }
            _ => {}
        }
        self.connect(conn).await
    }

    async fn connect(&self, conn: &mut Connection<T>) -> bool {
        let service = self.config.service;
        let attempts = self.config.retry.attempts.max(1);

        conn.transport.close();
        conn.capability = None;
        self.set_state(conn, ConnectionState::Connecting);

        for attempt in 1..=attempts {
            if conn.transport.connect().await {
                info!(service = %service, endpoint = %conn.transport.endpoint(), attempt, "connected");
                if let Some(probe) = &self.config.probe {
                    conn.capability = Some(probe.probe(&mut conn.transport).await);
                }
                conn.gave_up_at = None;
                self.set_state(conn, ConnectionState::Connected);
                return true;
            }

            warn!(
                service = %service,
                endpoint = %conn.transport.endpoint(),
                attempt,
                attempts,
                error = conn.transport.last_error().unwrap_or("unknown"),
                "connection attempt failed"
            );
            if attempt < attempts {
                tokio::time::sleep(self.config.retry.backoff).await;
            }
        }

        conn.gave_up_at = Some(Instant::now());
        let state = if self.config.stub.is_some() {
            ConnectionState::Stubbed
        } else {
            ConnectionState::Unavailable
        };
        error!(service = %service, attempts, state = %state, "giving up on connection");
        self.set_state(conn, state);
        false
    }

    fn fallback(
        &self,
        conn: &Connection<T>,
        request: &CommandRequest,
        read_only: bool,
    ) -> Result<Value> {
        let stubbed = match &self.config.stub {
            Some(stub) if read_only && conn.state == ConnectionState::Stubbed => {
                stub.answer(request)
            }
            _ => None,
        };
        if let Some(reply) = stubbed {
            warn!(service = %self.config.service, command = request.name(), "answering from stub");
            return Ok(reply);
        }

        Err(Error::ConnectionUnavailable {
            service: self.config.service,
            reason: conn
                .transport
                .last_error()
                .unwrap_or("connection failed")
                .to_string(),
        })
    }

    fn set_state(&self, conn: &mut Connection<T>, state: ConnectionState) {
        conn.state = state;
        self.publish(conn);
    }

    fn publish(&self, conn: &Connection<T>) {
        let connected = conn.state == ConnectionState::Connected;
        self.status.send_replace(ConnectionStatus {
            service: self.config.service,
            state: conn.state,
            connected,
            extended: self
                .config
                .probe
                .as_ref()
                .map(|_| connected && conn.capability.is_some_and(Capability::is_extended)),
            endpoint: conn.transport.endpoint().to_string(),
            last_error: conn.transport.last_error().map(String::from),
        });
    }
}
