//! Placeholder answers for a service that cannot be reached.

use std::collections::BTreeMap;

use bridge::CommandRequest;
use serde_json::{Value, json};

/// Field set to `true` in every placeholder result.
pub const STUB_MARKER: &str = "stub";

/// Canned replies for read-only commands, used while a connection manager is
/// in stub mode. Mutating commands get no answer.
#[derive(Debug, Clone, Default)]
pub struct StubResponder {
    replies: BTreeMap<String, Value>,
}

impl StubResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `result` object returned for `command`.
    pub fn reply(mut self, command: impl Into<String>, result: Value) -> Self {
        self.replies.insert(command.into(), result);
        self
    }

    /// Placeholders for the modeling tool's informational commands.
    pub fn modeling() -> Self {
        Self::new()
            .reply(
                "get_scene_info",
                json!({
                    "name": "",
                    "objects": [],
                    "materials_count": 0,
                    "object_count": 0,
                }),
            )
            .reply("get_object_info", json!({ "object": null }))
            .reply("get_version_info", json!({ "version": "0.0.0" }))
    }

    /// Answer `request` in the remote reply shape, or `None` when the command
    /// has no placeholder.
    pub fn answer(&self, request: &CommandRequest) -> Option<Value> {
        let mut result = self.replies.get(request.name())?.clone();
        if let Value::Object(fields) = &mut result {
            fields.insert(STUB_MARKER.to_string(), Value::Bool(true));
        }
        Some(json!({
            "status": "success",
            "message": "service unreachable, returning placeholder data",
            "result": result,
        }))
    }
}
