//! Build MCP tool listings from tool definitions

use openapi_parser::ToolDefinition;
use serde_json::Value;

use crate::protocol::{McpInputSchema, McpTool};

/// Generator for the `tools/list` entries
pub struct ToolGenerator;

impl ToolGenerator {
    /// Listing for a tool derived from the OpenAPI document
    pub fn generate_tool(definition: &ToolDefinition) -> McpTool {
        Self::listing(
            &definition.name,
            &definition.description,
            definition.input_schema(),
        )
    }

    /// Listing from a name, description and JSON Schema object.
    ///
    /// Generated servers call this with the schema they were emitted with. A
    /// schema that is not an object falls back to an empty argument list.
    pub fn listing(name: &str, description: &str, schema: Value) -> McpTool {
        let input_schema = serde_json::from_value::<McpInputSchema>(schema).unwrap_or_else(|e| {
            tracing::warn!("Invalid input schema for tool {}: {}", name, e);
            McpInputSchema::default()
        });

        McpTool {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema,
        }
    }

    /// Listing from a schema embedded as JSON text
    pub fn listing_json(name: &str, description: &str, schema: &str) -> McpTool {
        let schema = serde_json::from_str(schema).unwrap_or_else(|e| {
            tracing::warn!("Unparseable input schema for tool {}: {}", name, e);
            Value::Null
        });
        Self::listing(name, description, schema)
    }
}
