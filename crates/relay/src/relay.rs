//! The surface the request server talks to.

use bridge::{CapabilityProbe, Endpoint, HttpTransport, Transport, TransportConfig};
use catalog::{Catalog, ServiceKind};
use serde::Serialize;
use serde_json::{Map, Value};
use sessions::{EventKind, SessionId, SessionRegistry};
use tracing::info;

use crate::config::RelayConfig;
use crate::connection::{ConnectionManager, ConnectionStatus, ManagerConfig};
use crate::dispatch::Dispatcher;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::stub::StubResponder;

/// Liveness route of the modeling tool's add-on server.
pub const MODELING_LIVENESS_PATH: &str = "/ping";
/// Liveness route of the engine editor's Python server.
pub const ENGINE_LIVENESS_PATH: &str = "/status";

/// Connection snapshot for both services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub modeling: ConnectionStatus,
    pub engine: ConnectionStatus,
}

/// Dispatcher plus session registry, built once at startup and shared by
/// reference with every request handler.
pub struct Relay<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
    sessions: SessionRegistry,
}

impl Relay<HttpTransport> {
    /// Build HTTP-backed connection managers for both services.
    ///
    /// Nothing is dialed here; connections open on first use or through
    /// [`connect_all`](Relay::connect_all).
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        config.validate()?;
        let connection = &config.connection;

        let transport = |endpoint: Endpoint, liveness_path: &str| {
            HttpTransport::new(
                TransportConfig::new(endpoint, liveness_path)
                    .with_timeouts(connection.connect_timeout(), connection.execute_timeout()),
            )
        };

        let modeling = ConnectionManager::new(
            transport(config.modeling.endpoint()?, MODELING_LIVENESS_PATH),
            ManagerConfig::new(ServiceKind::Modeling)
                .with_retry(connection.retry_policy())
                .with_probe(CapabilityProbe::default())
                .with_stub(StubResponder::modeling())
                .verify_on_use(config.modeling.verify_on_use)
                .recheck_after(connection.stub_recheck()),
        );
        let engine = ConnectionManager::new(
            transport(config.engine.endpoint()?, ENGINE_LIVENESS_PATH),
            ManagerConfig::new(ServiceKind::Engine)
                .with_retry(connection.retry_policy())
                .verify_on_use(config.engine.verify_on_use)
                .recheck_after(connection.stub_recheck()),
        );

        Ok(Self::new(Dispatcher::new(Catalog::builtin()?, modeling, engine)))
    }
}

impl<T: Transport> Relay<T> {
    pub fn new(dispatcher: Dispatcher<T>) -> Self {
        Self {
            dispatcher,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.dispatcher.catalog()
    }

    pub fn manager(&self, service: ServiceKind) -> &ConnectionManager<T> {
        self.dispatcher.manager(service)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Dispatch a tool call. Never fails; errors come back as envelopes.
    pub async fn handle_tool_call(&self, tool: &str, arguments: &Map<String, Value>) -> Envelope {
        self.dispatcher.dispatch(tool, arguments).await
    }

    /// Dispatch a tool call and push the envelope to `session`.
    ///
    /// The envelope is returned even when the session is already closed.
    pub async fn handle_tool_call_in_session(
        &self,
        session: SessionId,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> Envelope {
        let envelope = self.handle_tool_call(tool, arguments).await;
        self.sessions.push(
            session,
            EventKind::ToolResult {
                tool: tool.to_string(),
                envelope: envelope.to_value(),
            },
        );
        envelope
    }

    pub fn connection_status(&self) -> StatusReport {
        StatusReport {
            modeling: self.manager(ServiceKind::Modeling).status(),
            engine: self.manager(ServiceKind::Engine).status(),
        }
    }

    /// Connect both services concurrently and report the outcome.
    pub async fn connect_all(&self) -> StatusReport {
        tokio::join!(
            self.manager(ServiceKind::Modeling).ensure_connected(),
            self.manager(ServiceKind::Engine).ensure_connected(),
        );
        self.connection_status()
    }

    pub fn open_session(&self) -> SessionId {
        self.sessions.open()
    }

    pub fn push(&self, session: SessionId, event: EventKind) -> bool {
        self.sessions.push(session, event)
    }

    pub fn close_session(&self, session: SessionId) -> bool {
        self.sessions.close(session)
    }

    /// Close both connections and every open session.
    pub async fn shutdown(&self) {
        tokio::join!(
            self.manager(ServiceKind::Modeling).disconnect(),
            self.manager(ServiceKind::Engine).disconnect(),
        );
        for session in self.sessions.list() {
            self.sessions.close(session.id);
        }
        info!("relay shut down");
    }
}
