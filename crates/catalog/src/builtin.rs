//! Built-in tool table.

use crate::tool::{ServiceKind, ToolDefinition};

const LOCATION: &str = "[x, y, z] location coordinates";
const SCALE: &str = "[x, y, z] scale factors";
const COLOR: &str = "[R, G, B] color values (0.0-1.0)";

pub(crate) fn definitions() -> Vec<ToolDefinition> {
    let mut tools = modeling();
    tools.extend(engine());
    tools
}

fn modeling() -> Vec<ToolDefinition> {
    use ServiceKind::Modeling;

    vec![
        ToolDefinition::new(
            "mcp_blender_get_scene_info",
            Modeling,
            "Get detailed information about the current Blender scene, including objects, materials, and settings.",
        )
        .read_only(),
        ToolDefinition::new(
            "mcp_blender_get_object_info",
            Modeling,
            "Get detailed information about a specific object in the Blender scene.",
        )
        .required("object_name", "The name of the object to get information about")
        .read_only(),
        ToolDefinition::new(
            "mcp_blender_create_primitive",
            Modeling,
            "Create a basic primitive object in Blender, optionally colored.",
        )
        .required("type", "Object type (CUBE, SPHERE, CYLINDER, PLANE, CONE, TORUS, EMPTY)")
        .optional("name", "Name for the object")
        .optional("location", LOCATION)
        .optional("rotation", "[x, y, z] rotation in radians")
        .optional("scale", SCALE)
        .optional("color", COLOR),
        ToolDefinition::new(
            "mcp_blender_create_material",
            Modeling,
            "Create a new material in Blender with specified properties.",
        )
        .required("name", "Name for the material")
        .required("color", "Base color as [R, G, B] values (0.0-1.0)")
        .optional("metallic", "Metallic value (0.0-1.0)")
        .optional("roughness", "Roughness value (0.0-1.0)")
        .optional("specular", "Specular value (0.0-1.0)"),
        ToolDefinition::new(
            "mcp_blender_assign_material",
            Modeling,
            "Assign a material to an object in Blender.",
        )
        .required("object_name", "Name of the object to assign the material to")
        .required("material_name", "Name of the material to assign"),
        ToolDefinition::new(
            "mcp_blender_transform_object",
            Modeling,
            "Transform an object in Blender by modifying its location, rotation, or scale.",
        )
        .required("object_name", "Name of the object to transform")
        .optional("location", LOCATION)
        .optional("rotation", "[x, y, z] rotation in radians")
        .optional("scale", SCALE),
        ToolDefinition::new(
            "mcp_blender_export_model",
            Modeling,
            "Export a model from Blender to a file.",
        )
        .required("object_name", "Name of the object to export")
        .required("file_path", "Path where the file should be saved")
        .required("format", "Export format (FBX, OBJ, GLTF, etc.)"),
        ToolDefinition::new(
            "mcp_blender_execute_code",
            Modeling,
            "Execute arbitrary Python code in Blender. Use only when no specific tool fits.",
        )
        .required("code", "Python code to execute in Blender"),
        ToolDefinition::new(
            "mcp_blender_extended_scene_info",
            Modeling,
            "Get scene information enriched with the extended add-on version when the extended add-on is installed.",
        )
        .read_only(),
        ToolDefinition::new(
            "mcp_blender_extended_command",
            Modeling,
            "Run the example command provided by the extended Blender add-on.",
        )
        .optional("param1", "A string parameter")
        .optional("param2", "An integer parameter")
        .requires_extended(),
    ]
}

fn engine() -> Vec<ToolDefinition> {
    use ServiceKind::Engine;

    vec![
        ToolDefinition::new(
            "mcp_unreal_get_engine_version",
            Engine,
            "Get the version of Unreal Engine that is currently running.",
        )
        .read_only(),
        ToolDefinition::new(
            "mcp_unreal_create_level",
            Engine,
            "Create a new level in Unreal Engine.",
        )
        .required("level_name", "Name of the level to create"),
        ToolDefinition::new(
            "mcp_unreal_create_actor",
            Engine,
            "Create a new actor in the current Unreal Engine level.",
        )
        .required("actor_class", "Class of actor to create (e.g., StaticMeshActor)")
        .optional("location", LOCATION)
        .optional("rotation", "[pitch, yaw, roll] rotation in degrees")
        .optional("scale", SCALE)
        .optional("name", "Name for the actor"),
        ToolDefinition::new(
            "mcp_unreal_import_asset",
            Engine,
            "Import an asset (model, texture, etc.) into Unreal Engine.",
        )
        .required("file_path", "Path to the file to import")
        .required(
            "destination_path",
            "Content browser path where the asset should be imported",
        )
        .optional("asset_name", "Name for the imported asset"),
        ToolDefinition::new(
            "mcp_unreal_create_blueprint",
            Engine,
            "Create a new Blueprint class in Unreal Engine.",
        )
        .required("name", "Name for the blueprint")
        .required("parent_class", "Parent class for the blueprint")
        .required(
            "save_path",
            "Content browser path where the blueprint should be saved",
        ),
        ToolDefinition::new(
            "mcp_unreal_modify_actor",
            Engine,
            "Modify an existing actor in the current Unreal Engine level.",
        )
        .required("actor_name", "Name of the actor to modify")
        .optional("location", LOCATION)
        .optional("rotation", "[pitch, yaw, roll] rotation in degrees")
        .optional("scale", SCALE)
        .optional("visible", "Boolean to set visibility"),
        ToolDefinition::new(
            "mcp_unreal_set_material",
            Engine,
            "Set or create a material for an actor in Unreal Engine.",
        )
        .required("actor_name", "Name of the actor to apply the material to")
        .optional(
            "material_path",
            "Content browser path to an existing material, or path to create a new material",
        )
        .optional("color", COLOR),
        ToolDefinition::new(
            "mcp_unreal_execute_code",
            Engine,
            "Execute arbitrary Python code in Unreal Engine. Use only when no specific tool fits.",
        )
        .required("code", "Python code to execute in Unreal Engine"),
    ]
}
