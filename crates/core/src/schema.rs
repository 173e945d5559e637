// Schema Generator
//
// Renders a ToolDescriptor into the JSON invocation schema sent to the model.
//
// Design decisions:
// - Only the basic scalars map to their JSON primitive; enums render as
//   string + enum list; every other type degrades to "string". This is a
//   known approximation, coercion recovers the real shape on the way back.
// - Rendering is a pure function of the descriptor, so schemas are never
//   cached: descriptors are cached by the registry instead.

use serde_json::{json, Map, Value};

use crate::tool_types::{ParamType, ToolDescriptor};

/// Instruction appended to the prompt-embedded tool listing
pub const TOOL_CALL_INSTRUCTIONS: &str = "To use a tool, respond with a JSON object of the form \
{\"tool_calls\": [{\"name\": \"<tool name>\", \"arguments\": {<argument name>: <value>}}]}. \
If no tool is needed, answer the user directly in plain text.";

/// Output shape of a generated schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFlavor {
    /// `{type, name, description, parameters}` (Responses API)
    Flat,
    /// `{type, function: {name, description, parameters}}` (Chat Completions)
    Nested,
}

/// Generate the invocation schema for a tool
pub fn generate_schema(tool: &ToolDescriptor, flavor: SchemaFlavor) -> Value {
    let parameters = parameters_object(tool);

    match flavor {
        SchemaFlavor::Flat => json!({
            "type": "function",
            "name": tool.name,
            "description": tool.description,
            "parameters": parameters,
        }),
        SchemaFlavor::Nested => json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": parameters,
            },
        }),
    }
}

/// Render tools as a text block for the prompt-embedded mode
pub fn render_system_prompt<'a>(tools: impl IntoIterator<Item = &'a ToolDescriptor>) -> String {
    let listing: Vec<String> = tools
        .into_iter()
        .map(|tool| {
            let schema = generate_schema(tool, SchemaFlavor::Nested);
            serde_json::to_string_pretty(&schema).unwrap_or_else(|_| schema.to_string())
        })
        .collect();

    format!(
        "You have access to the following tools:\n\n{}\n\n{}",
        listing.join("\n\n"),
        TOOL_CALL_INSTRUCTIONS
    )
}

fn parameters_object(tool: &ToolDescriptor) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        let mut property = property_type(&param.param_type);
        property.insert(
            "description".to_string(),
            Value::String(param.description.clone()),
        );
        if let Some(default) = param.default_value() {
            property.insert("default".to_string(), default.clone());
        }
        properties.insert(param.name.clone(), Value::Object(property));

        if param.is_required() {
            required.push(Value::String(param.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn property_type(param_type: &ParamType) -> Map<String, Value> {
    let mut property = Map::new();
    match param_type {
        ParamType::Integer => {
            property.insert("type".to_string(), json!("integer"));
        }
        ParamType::Number => {
            property.insert("type".to_string(), json!("number"));
        }
        ParamType::Boolean => {
            property.insert("type".to_string(), json!("boolean"));
        }
        ParamType::Enum(alternatives) => {
            property.insert("type".to_string(), json!("string"));
            property.insert("enum".to_string(), json!(alternatives));
        }
        // Strings and everything outside the basic set
        _ => {
            property.insert("type".to_string(), json!("string"));
        }
    }
    property
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_types::{CustomType, ParameterSpec};

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            "convert_units",
            "Convert a value between units.",
            vec![
                ParameterSpec::new("value", ParamType::Number).describe("Value to convert"),
                ParameterSpec::new("from_unit", ParamType::one_of(["km", "mi"])),
                ParameterSpec::new("precision", ParamType::Integer).with_default(2),
                ParameterSpec::new("date", ParamType::Custom(CustomType::date())).optional(),
                ParameterSpec::new("tags", ParamType::Array).optional(),
                ParameterSpec::new("exact", ParamType::Boolean).with_default(false),
            ],
        )
    }

    #[test]
    fn test_flat_schema() {
        let schema = generate_schema(&descriptor(), SchemaFlavor::Flat);

        assert_eq!(schema["type"], "function");
        assert_eq!(schema["name"], "convert_units");
        assert_eq!(schema["description"], "Convert a value between units.");

        let props = &schema["parameters"]["properties"];
        assert_eq!(props["value"]["type"], "number");
        assert_eq!(props["value"]["description"], "Value to convert");
        assert_eq!(props["from_unit"]["type"], "string");
        assert_eq!(props["from_unit"]["enum"], json!(["km", "mi"]));
        assert_eq!(props["precision"]["default"], 2);
        assert_eq!(props["exact"]["type"], "boolean");
        assert_eq!(props["exact"]["default"], false);
        assert_eq!(props["date"]["type"], "string");
        assert!(props["date"].get("default").is_none());
        assert_eq!(props["tags"]["type"], "string");

        assert_eq!(
            schema["parameters"]["required"],
            json!(["value", "from_unit"])
        );
    }

    #[test]
    fn test_nested_schema_matches_flat_parameters() {
        let tool = descriptor();
        let flat = generate_schema(&tool, SchemaFlavor::Flat);
        let nested = generate_schema(&tool, SchemaFlavor::Nested);

        assert_eq!(nested["type"], "function");
        assert_eq!(nested["function"]["name"], "convert_units");
        assert_eq!(nested["function"]["parameters"], flat["parameters"]);
    }

    #[test]
    fn test_schema_is_deterministic() {
        let tool = descriptor();
        let first = serde_json::to_string(&generate_schema(&tool, SchemaFlavor::Flat)).unwrap();
        let second = serde_json::to_string(&generate_schema(&tool, SchemaFlavor::Flat)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_system_prompt() {
        let tool = descriptor();
        let prompt = render_system_prompt([&tool]);

        assert!(prompt.starts_with("You have access to the following tools:"));
        assert!(prompt.contains("\"convert_units\""));
        assert!(prompt.ends_with(TOOL_CALL_INSTRUCTIONS));
    }
}
