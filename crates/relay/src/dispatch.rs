//! Tool-call dispatch: validate, route, compose, normalize.

use bridge::{CommandRequest, HttpTransport, Transport};
use catalog::{Catalog, ServiceKind};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::connection::ConnectionManager;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::plan::{self, FollowUp, Plan, SCENE_INFO_COMMAND, VERSION_INFO_COMMAND};

/// Routes cataloged tool calls to the connection manager that owns them.
pub struct Dispatcher<T = HttpTransport> {
    catalog: Catalog,
    modeling: ConnectionManager<T>,
    engine: ConnectionManager<T>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(
        catalog: Catalog,
        modeling: ConnectionManager<T>,
        engine: ConnectionManager<T>,
    ) -> Self {
        Self {
            catalog,
            modeling,
            engine,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn manager(&self, service: ServiceKind) -> &ConnectionManager<T> {
        match service {
            ServiceKind::Modeling => &self.modeling,
            ServiceKind::Engine => &self.engine,
        }
    }

    /// Run one tool call. Every failure comes back as an error envelope.
    pub async fn dispatch(&self, tool: &str, arguments: &Map<String, Value>) -> Envelope {
        let envelope = self
            .try_dispatch(tool, arguments)
            .await
            .unwrap_or_else(Envelope::from);

        let logged = Value::Object(arguments.clone());
        info!(
            tool,
            arguments = %logged,
            status = %envelope.status,
            kind = ?envelope.kind,
            message = envelope.message.as_deref().unwrap_or(""),
            "tool dispatched"
        );
        envelope
    }

    async fn try_dispatch(&self, tool: &str, arguments: &Map<String, Value>) -> Result<Envelope> {
        let definition = self
            .catalog
            .lookup(tool)
            .ok_or_else(|| Error::UnknownTool(tool.to_string()))?;

        let missing = definition.missing_parameters(arguments);
        if !missing.is_empty() {
            return Err(Error::MissingParameters {
                tool: tool.to_string(),
                missing,
            });
        }

        let manager = self.manager(definition.service);
        let capability = if definition.requires_extended || tool == plan::EXTENDED_SCENE_INFO {
            let connected = manager.ensure_connected().await;
            if definition.requires_extended {
                if !connected {
                    return Err(unavailable(manager));
                }
                if !manager.capability().is_some_and(bridge::Capability::is_extended) {
                    return Err(Error::UnsupportedCapability {
                        tool: tool.to_string(),
                        service: definition.service,
                    });
                }
            }
            manager.capability()
        } else {
            None
        };

        match plan::build(definition, arguments, capability)? {
            Plan::Steps { first, follow_ups } => {
                self.run_steps(manager, first, &follow_ups, definition.read_only)
                    .await
            }
            Plan::ExtendedSceneInfo { extended } => {
                self.extended_scene_info(manager, extended, definition.read_only)
                    .await
            }
        }
    }

    /// Run `first`, then each follow-up in order while every step succeeds.
    ///
    /// A failed first step is returned as-is. Follow-up outcomes are reported
    /// under `data.follow_ups` of the first step's envelope. Only read-only
    /// tools may be answered by the stub.
    async fn run_steps(
        &self,
        manager: &ConnectionManager<T>,
        first: CommandRequest,
        follow_ups: &[FollowUp],
        read_only: bool,
    ) -> Result<Envelope> {
        let mut envelope = Envelope::from_remote(send(manager, &first, read_only).await?);
        if envelope.is_error() || follow_ups.is_empty() {
            return Ok(envelope);
        }

        let mut reports = Vec::new();
        for follow_up in follow_ups {
            let Some(request) = follow_up.request(&envelope) else {
                warn!(command = follow_up.name(), "follow-up skipped, no object name available");
                continue;
            };
            let outcome = match send(manager, &request, read_only).await {
                Ok(reply) => Envelope::from_remote(reply),
                Err(err) => Envelope::from(err),
            };
            let failed = outcome.is_error();
            reports.push(serde_json::json!({
                "command": follow_up.name(),
                "result": outcome.to_value(),
            }));
            if failed {
                warn!(command = follow_up.name(), "follow-up failed, remaining steps aborted");
                break;
            }
        }

        if !reports.is_empty() {
            envelope.insert("follow_ups", Value::Array(reports));
        }
        Ok(envelope)
    }

    async fn extended_scene_info(
        &self,
        manager: &ConnectionManager<T>,
        extended: bool,
        read_only: bool,
    ) -> Result<Envelope> {
        let version = if extended {
            let request = CommandRequest::command(VERSION_INFO_COMMAND, Map::new());
            let reply = Envelope::from_remote(send(manager, &request, read_only).await?);
            if reply.is_error() {
                return Ok(reply);
            }
            Some(
                reply
                    .get(bridge::EXTENDED_MARKER)
                    .cloned()
                    .unwrap_or_else(|| Value::String("unknown".into())),
            )
        } else {
            None
        };

        let request = CommandRequest::command(SCENE_INFO_COMMAND, Map::new());
        let scene = Envelope::from_remote(send(manager, &request, read_only).await?);
        if scene.is_error() {
            return Ok(scene);
        }

        let mut data = Map::new();
        data.insert("extended_info_available".into(), Value::Bool(extended));
        if let Some(version) = version {
            data.insert("extended_version".into(), version);
        }
        data.insert(
            "scene_info".into(),
            scene.data.clone().map(Value::Object).unwrap_or(Value::Null),
        );

        let mut envelope = Envelope::success(Some(data));
        envelope.message = scene.message;
        Ok(envelope)
    }
}

async fn send<T: Transport>(
    manager: &ConnectionManager<T>,
    request: &CommandRequest,
    read_only: bool,
) -> Result<Value> {
    if read_only {
        manager.execute_read_only(request).await
    } else {
        manager.execute(request).await
    }
}

fn unavailable<T: Transport>(manager: &ConnectionManager<T>) -> Error {
    let status = manager.status();
    Error::ConnectionUnavailable {
        service: status.service,
        reason: status
            .last_error
            .unwrap_or_else(|| format!("{} is {}", status.endpoint, status.state)),
    }
}
