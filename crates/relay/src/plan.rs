//! Translation from a validated tool call to the command(s) sent upstream.

use bridge::{Capability, CommandRequest, PROBE_COMMAND};
use catalog::{ServiceKind, ToolDefinition};
use serde_json::{Map, Value};

use crate::envelope::Envelope;
use crate::error::{Error, Result};

pub(crate) const EXTENDED_SCENE_INFO: &str = "mcp_blender_extended_scene_info";
pub(crate) const SCENE_INFO_COMMAND: &str = "get_scene_info";
pub(crate) const VERSION_INFO_COMMAND: &str = PROBE_COMMAND;

/// What the dispatcher sends for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Plan {
    /// One command, then follow-ups that run only while every step succeeds.
    Steps {
        first: CommandRequest,
        follow_ups: Vec<FollowUp>,
    },
    /// Version then scene info on extended add-ons, scene info alone otherwise.
    ExtendedSceneInfo { extended: bool },
}

/// A secondary call derived from the first step's result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FollowUp {
    /// Color the object the first step created.
    Colorize {
        color: Value,
        fallback_name: Option<String>,
    },
}

impl FollowUp {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Colorize { .. } => "set_material",
        }
    }

    /// Build the request, or `None` when the first result lacks what it needs.
    pub(crate) fn request(&self, first: &Envelope) -> Option<CommandRequest> {
        match self {
            Self::Colorize {
                color,
                fallback_name,
            } => {
                let name = first
                    .get("name")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .or_else(|| fallback_name.clone())?;
                let mut params = Map::new();
                params.insert("object_name".into(), Value::String(name));
                params.insert("color".into(), color.clone());
                Some(CommandRequest::command(self.name(), params))
            }
        }
    }
}

pub(crate) fn build(
    tool: &ToolDefinition,
    arguments: &Map<String, Value>,
    capability: Option<Capability>,
) -> Result<Plan> {
    match tool.service {
        ServiceKind::Modeling => modeling(tool, arguments, capability),
        ServiceKind::Engine => engine(tool, arguments),
    }
}

fn single(request: CommandRequest) -> Plan {
    Plan::Steps {
        first: request,
        follow_ups: Vec::new(),
    }
}

fn modeling(
    tool: &ToolDefinition,
    arguments: &Map<String, Value>,
    capability: Option<Capability>,
) -> Result<Plan> {
    let plan = match tool.name.as_str() {
        "mcp_blender_create_primitive" => {
            let params = present(arguments, &["type", "name", "location", "rotation", "scale"]);
            let follow_ups = match arguments.get("color") {
                Some(color) if !color.is_null() => vec![FollowUp::Colorize {
                    color: color.clone(),
                    fallback_name: text(arguments, "name"),
                }],
                _ => Vec::new(),
            };
            Plan::Steps {
                first: CommandRequest::command("create_object", params),
                follow_ups,
            }
        }
        "mcp_blender_get_object_info" => single(CommandRequest::command(
            "get_object_info",
            present(arguments, &["object_name"]),
        )),
        "mcp_blender_execute_code" => {
            let mut params = Map::new();
            params.insert("code".into(), Value::String(code(tool, arguments)?));
            single(CommandRequest::command("execute_code", params))
        }
        "mcp_blender_extended_command" => {
            let mut params = Map::new();
            params.insert("param1".into(), or_default(arguments, "param1", Value::from("")));
            params.insert("param2".into(), or_default(arguments, "param2", Value::from(0)));
            single(CommandRequest::command("extended_command_example", params))
        }
        EXTENDED_SCENE_INFO => Plan::ExtendedSceneInfo {
            extended: capability.is_some_and(Capability::is_extended),
        },
        _ => passthrough(tool, arguments),
    };
    Ok(plan)
}

fn engine(tool: &ToolDefinition, arguments: &Map<String, Value>) -> Result<Plan> {
    let request = match tool.name.as_str() {
        "mcp_unreal_get_engine_version" => CommandRequest::code(scripts::engine_version()),
        "mcp_unreal_create_level" => {
            let level = required_text(tool, arguments, "level_name")?;
            CommandRequest::code(scripts::create_level(&level))
        }
        "mcp_unreal_import_asset" => {
            let file_path = required_text(tool, arguments, "file_path")?;
            let destination = required_text(tool, arguments, "destination_path")?;
            let asset_name = text(arguments, "asset_name");
            CommandRequest::code(scripts::import_asset(
                &file_path,
                &destination,
                asset_name.as_deref(),
            ))
        }
        "mcp_unreal_execute_code" => CommandRequest::code(code(tool, arguments)?),
        _ => return Ok(passthrough(tool, arguments)),
    };
    Ok(single(request))
}

/// Typed command named after the tool, arguments forwarded untouched.
fn passthrough(tool: &ToolDefinition, arguments: &Map<String, Value>) -> Plan {
    single(CommandRequest::command(tool.command_name(), arguments.clone()))
}

/// Copy the listed arguments that are present and not null.
fn present(arguments: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| {
            arguments
                .get(*key)
                .filter(|value| !value.is_null())
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect()
}

fn or_default(arguments: &Map<String, Value>, key: &str, default: Value) -> Value {
    match arguments.get(key) {
        Some(value) if !value.is_null() => value.clone(),
        _ => default,
    }
}

/// An argument as text: strings verbatim, other values as JSON.
fn text(arguments: &Map<String, Value>, key: &str) -> Option<String> {
    match arguments.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn required_text(tool: &ToolDefinition, arguments: &Map<String, Value>, key: &str) -> Result<String> {
    text(arguments, key).ok_or_else(|| Error::MissingParameters {
        tool: tool.name.clone(),
        missing: vec![key.to_string()],
    })
}

fn code(tool: &ToolDefinition, arguments: &Map<String, Value>) -> Result<String> {
    match arguments.get("code") {
        Some(Value::String(code)) => Ok(code.clone()),
        Some(_) => Err(Error::ExecutionFailure(format!(
            "{}: argument `code` must be a string",
            tool.name
        ))),
        None => Err(Error::MissingParameters {
            tool: tool.name.clone(),
            missing: vec!["code".to_string()],
        }),
    }
}

/// Editor scripts for engine tools the editor only exposes through Python.
mod scripts {
    use serde_json::Value;

    /// A Python string literal. JSON string escapes are valid Python escapes.
    fn literal(s: &str) -> String {
        Value::String(s.to_string()).to_string()
    }

    pub(super) fn engine_version() -> String {
        "import unreal\nversion = unreal.SystemLibrary.get_engine_version()\nprint(version)\n"
            .to_string()
    }

    pub(super) fn create_level(level_name: &str) -> String {
        format!(
            "import unreal\nunreal.EditorLevelLibrary.new_level({})\n",
            literal(level_name)
        )
    }

    pub(super) fn import_asset(
        file_path: &str,
        destination_path: &str,
        asset_name: Option<&str>,
    ) -> String {
        let mut script = format!(
            "import unreal\n\
             task = unreal.AssetImportTask()\n\
             task.filename = {}\n\
             task.destination_path = {}\n",
            literal(file_path),
            literal(destination_path),
        );
        if let Some(name) = asset_name {
            script.push_str(&format!("task.destination_name = {}\n", literal(name)));
        }
        script.push_str(
            "task.automated = True\n\
             task.save = True\n\
             unreal.AssetToolsHelpers.get_asset_tools().import_asset_tasks([task])\n\
             print(task.imported_object_paths)\n",
        );
        script
    }
}
