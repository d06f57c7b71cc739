//! Scripted in-memory transport for state-machine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use bridge::{CommandRequest, Endpoint, Transport};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Connect,
    Ping,
    Execute(CommandRequest),
}

/// Shared view of every call a [`FakeTransport`] received.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Connect)).count()
    }

    pub(crate) fn pings(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Ping)).count()
    }

    /// Names of executed commands, in order.
    pub(crate) fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(request) => Some(request.name().to_string()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<CommandRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|name| *name == command).count()
    }
}

/// A transport whose connect, ping and execute outcomes are scripted.
///
/// Unscripted connects and pings succeed; unscripted commands answer
/// `{"status": "success", "result": {}}`.
pub(crate) struct FakeTransport {
    endpoint: Endpoint,
    connects: VecDeque<bool>,
    pings: VecDeque<bool>,
    replies: HashMap<String, VecDeque<bridge::Result<Value>>>,
    open: bool,
    last_error: Option<String>,
    log: CallLog,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            endpoint: Endpoint::new("fake", 1).unwrap(),
            connects: VecDeque::new(),
            pings: VecDeque::new(),
            replies: HashMap::new(),
            open: false,
            last_error: None,
            log: CallLog::default(),
        }
    }

    pub(crate) fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub(crate) fn connects(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.connects.extend(outcomes);
        self
    }

    pub(crate) fn unreachable(self) -> Self {
        self.connects(std::iter::repeat_n(false, 64))
    }

    pub(crate) fn pings(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.pings.extend(outcomes);
        self
    }

    pub(crate) fn reply(mut self, command: &str, reply: bridge::Result<Value>) -> Self {
        self.replies
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn ok(self, command: &str, body: Value) -> Self {
        self.reply(command, Ok(body))
    }
}

impl Transport for FakeTransport {
    async fn connect(&mut self) -> bool {
        self.log.record(Call::Connect);
        self.open = self.connects.pop_front().unwrap_or(true);
        self.last_error = (!self.open).then(|| "connection refused".to_string());
        self.open
    }

    async fn ping(&mut self) -> bridge::Result<()> {
        self.log.record(Call::Ping);
        if self.pings.pop_front().unwrap_or(true) {
            Ok(())
        } else {
            Err(bridge::Error::Connect("connection reset".into()))
        }
    }

    async fn execute(&mut self, request: &CommandRequest) -> bridge::Result<Value> {
        if !self.open && !self.connect().await {
            return Err(bridge::Error::NotConnected);
        }
        self.log.record(Call::Execute(request.clone()));
        let reply = self
            .replies
            .get_mut(request.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!({"status": "success", "result": {}})));
        if let Err(err) = &reply {
            self.last_error = Some(err.to_string());
        }
        reply
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}
