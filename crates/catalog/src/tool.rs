//! Tool definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remote service a tool runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// The 3D modeling tool.
    Modeling,
    /// The game-engine editor.
    Engine,
}

impl ServiceKind {
    /// Prefix shared by every tool name targeting this service.
    pub fn tool_prefix(self) -> &'static str {
        match self {
            Self::Modeling => "mcp_blender_",
            Self::Engine => "mcp_unreal_",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modeling => "modeling",
            Self::Engine => "engine",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A cataloged operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub service: ServiceKind,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Only reads remote state. Only these tools may get placeholder answers
    /// when the service is unreachable.
    #[serde(default)]
    pub read_only: bool,
    /// Needs the extended add-on.
    #[serde(default)]
    pub requires_extended: bool,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        service: ServiceKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service,
            description: description.into(),
            parameters: Vec::new(),
            read_only: false,
            requires_extended: false,
        }
    }

    pub fn required(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            description: description.into(),
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            description: description.into(),
            required: false,
        });
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn requires_extended(mut self) -> Self {
        self.requires_extended = true;
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    /// Required parameters absent from `arguments` or set to null, in
    /// declaration order.
    pub fn missing_parameters(&self, arguments: &Map<String, Value>) -> Vec<String> {
        self.required_parameters()
            .filter(|name| arguments.get(*name).is_none_or(Value::is_null))
            .map(str::to_string)
            .collect()
    }

    /// Command name the remote plugin knows this tool by.
    pub fn command_name(&self) -> &str {
        self.name
            .strip_prefix(self.service.tool_prefix())
            .unwrap_or(&self.name)
    }

    /// Human-readable documentation block.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Tool: {}\n", self.name));
        out.push_str(&format!("Service: {}\n", self.service));
        out.push_str(&format!("Description: {}\n", self.description));
        if self.parameters.is_empty() {
            out.push_str("Parameters: None\n");
        } else {
            out.push_str("Parameters:\n");
            for param in &self.parameters {
                let marker = if param.required { " (required)" } else { "" };
                out.push_str(&format!("  - {}: {}{marker}\n", param.name, param.description));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export_tool() -> ToolDefinition {
        ToolDefinition::new("mcp_blender_export_model", ServiceKind::Modeling, "Export a model")
            .required("object_name", "Object to export")
            .required("file_path", "Destination file")
            .optional("format", "Export format")
    }

    #[test]
    fn missing_parameters_in_declaration_order() {
        let tool = export_tool();
        let args = json!({"format": "FBX"});
        assert_eq!(
            tool.missing_parameters(args.as_object().unwrap()),
            vec!["object_name", "file_path"]
        );
    }

    #[test]
    fn null_value_counts_as_missing() {
        let tool = export_tool();
        let args = json!({"object_name": null, "file_path": "/tmp/a.fbx", "format": null});
        assert_eq!(tool.missing_parameters(args.as_object().unwrap()), vec!["object_name"]);
    }

    #[test]
    fn command_name_strips_service_prefix() {
        assert_eq!(export_tool().command_name(), "export_model");
        let odd = ToolDefinition::new("custom", ServiceKind::Engine, "No prefix");
        assert_eq!(odd.command_name(), "custom");
    }

    #[test]
    fn describe_marks_required_parameters() {
        let text = export_tool().describe();
        assert!(text.contains("Tool: mcp_blender_export_model"));
        assert!(text.contains("  - object_name: Object to export (required)"));
        assert!(text.contains("  - format: Export format\n"));
    }
}
