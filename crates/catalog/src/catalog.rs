//! Catalog lookup and validation.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::builtin;
use crate::tool::{ServiceKind, ToolDefinition};
use crate::{Error, Result};

/// Immutable set of tool definitions keyed by name.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: BTreeMap<String, ToolDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate names.
    pub fn new(definitions: impl IntoIterator<Item = ToolDefinition>) -> Result<Self> {
        let mut tools = BTreeMap::new();
        for definition in definitions {
            if tools.contains_key(&definition.name) {
                return Err(Error::DuplicateTool(definition.name));
            }
            tools.insert(definition.name.clone(), definition);
        }
        Ok(Self { tools })
    }

    /// The tools exposed for the modeling tool and the engine editor.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin::definitions())
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Names of required parameters missing from `arguments`.
    ///
    /// An empty list means the call is valid.
    pub fn validate(&self, name: &str, arguments: &Map<String, Value>) -> Result<Vec<String>> {
        let definition = self
            .lookup(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        Ok(definition.missing_parameters(arguments))
    }

    pub fn by_service(&self, service: ServiceKind) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().filter(move |t| t.service == service)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn builtin_names_are_unique() {
        let count = builtin::definitions().len();
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), count);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tool = ToolDefinition::new("mcp_blender_dup", ServiceKind::Modeling, "a");
        let err = Catalog::new([tool.clone(), tool]).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "mcp_blender_dup"));
    }

    #[test]
    fn lookup_known_and_unknown() {
        let catalog = Catalog::builtin().unwrap();
        let tool = catalog.lookup("mcp_unreal_create_level").unwrap();
        assert_eq!(tool.service, ServiceKind::Engine);
        assert!(catalog.lookup("mcp_maya_create_cube").is_none());
    }

    #[test]
    fn validate_reports_missing_level_name() {
        let catalog = Catalog::builtin().unwrap();
        let missing = catalog
            .validate("mcp_unreal_create_level", &Map::new())
            .unwrap();
        assert_eq!(missing, vec!["level_name"]);
    }

    #[test]
    fn validate_accepts_complete_arguments() {
        let catalog = Catalog::builtin().unwrap();
        let missing = catalog
            .validate(
                "mcp_blender_create_primitive",
                &args(json!({"type": "CUBE", "name": "C1", "color": [1, 0, 0]})),
            )
            .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn validate_unknown_tool_is_an_error() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.validate("nope", &Map::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "nope"));
    }

    #[test]
    fn by_service_partitions_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let modeling = catalog.by_service(ServiceKind::Modeling).count();
        let engine = catalog.by_service(ServiceKind::Engine).count();
        assert_eq!(modeling + engine, catalog.len());
        assert!(
            catalog
                .by_service(ServiceKind::Engine)
                .all(|t| t.name.starts_with("mcp_unreal_"))
        );
        assert!(
            catalog
                .by_service(ServiceKind::Modeling)
                .all(|t| t.name.starts_with("mcp_blender_"))
        );
    }
}
