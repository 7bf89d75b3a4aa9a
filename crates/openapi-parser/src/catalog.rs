//! Tool definitions derived from GET operations
//!
//! A [`ToolDefinition`] is the unit both the code generator and the runtime
//! server work from: one per GET operation that carries an operation id, named
//! by the snake_case form of that id.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::mapping::{ParamType, TypeAnnotation};
use crate::naming::to_snake_case;
use crate::types::{ApiOperation, ParameterLocation, ParsedSpec};

/// Converted name of the operation that gets client-side pagination
pub const MARKDOWN_TOOL_NAME: &str = "filings_markdown_retrieve";

/// URL template fetched by the markdown tool
pub const MARKDOWN_PATH: &str = "/filings/{filing_id}/markdown/";

/// Default character window of the markdown tool
pub const MARKDOWN_DEFAULT_LIMIT: i64 = 50_000;

const NO_DESCRIPTION: &str = "No description available.";

const MARKDOWN_NOTE: &str = "NOTE: This tool uses client-side pagination. If the content is cut off, \
call this tool again with an increased 'offset'.";

/// How a tool is rendered and executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Forward arguments to the endpoint and return formatted JSON
    Standard,
    /// Fetch the whole markdown document and return one character window
    PaginatedMarkdown,
}

/// Where a tool argument ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentTarget {
    /// Substituted into the URL template
    Path,
    /// Sent as a query-string entry
    Query,
    /// Consumed by the tool itself (pagination window)
    Local,
}

impl From<ParameterLocation> for ArgumentTarget {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => Self::Path,
            ParameterLocation::Query => Self::Query,
        }
    }
}

/// One argument of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolParameter {
    /// Argument name exposed to callers (snake_case)
    pub name: String,
    /// Name used in the URL placeholder or query string
    pub wire_name: String,
    pub target: ArgumentTarget,
    pub param_type: ParamType,
    pub required: bool,
    /// Schema default; ignored for required parameters
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ToolParameter {
    /// Default applied when the caller omits the argument.
    ///
    /// Required parameters have none even if the schema declares one.
    pub fn effective_default(&self) -> Option<&Value> {
        if self.required {
            None
        } else {
            self.default.as_ref()
        }
    }

    /// Type annotation and default expression for emitted code
    pub fn annotation(&self) -> TypeAnnotation {
        TypeAnnotation::for_parameter(self.param_type, self.required, self.default.as_ref())
    }

    /// JSON Schema property describing this argument in a tool listing
    pub fn json_schema(&self) -> Value {
        let mut prop = serde_json::Map::new();
        if let Some(type_name) = self.param_type.schema_name() {
            prop.insert("type".to_string(), json!(type_name));
        }
        if let Some(description) = &self.description {
            prop.insert("description".to_string(), json!(description));
        }
        if let Some(default) = self.effective_default() {
            prop.insert("default".to_string(), default.clone());
        }
        Value::Object(prop)
    }
}

/// A callable tool derived from one GET operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Tool name (snake_case of the operation id)
    pub name: String,
    /// Original operation id
    pub operation_id: String,
    pub description: String,
    /// URL template relative to the API base URL
    pub path: String,
    pub parameters: Vec<ToolParameter>,
    pub kind: ToolKind,
}

impl ToolDefinition {
    /// Build the tool for an operation; `None` when it has no operation id
    pub fn from_operation(operation: &ApiOperation) -> Option<Self> {
        let operation_id = operation.operation_id.as_deref()?;
        let name = to_snake_case(operation_id);

        let description = operation
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string();

        if name == MARKDOWN_TOOL_NAME {
            return Some(Self::markdown(operation_id, description));
        }

        let mut parameters: Vec<ToolParameter> = Vec::with_capacity(operation.parameters.len());
        for p in &operation.parameters {
            let param_name = to_snake_case(&p.name);
            if parameters.iter().any(|existing| existing.name == param_name) {
                warn!(
                    "Tool {}: parameter {} also maps to {}, keeping the first",
                    name, p.name, param_name
                );
                continue;
            }
            parameters.push(ToolParameter {
                name: param_name,
                wire_name: p.name.clone(),
                target: p.location.into(),
                param_type: p.param_type,
                required: p.required,
                default: p.default.as_ref().and_then(|d| p.param_type.coerce_default(d)),
                description: p.description.clone(),
            });
        }

        Some(Self {
            name,
            operation_id: operation_id.to_string(),
            description,
            path: operation.path.clone(),
            parameters,
            kind: ToolKind::Standard,
        })
    }

    /// The paginated markdown tool has a fixed signature and path
    fn markdown(operation_id: &str, description: String) -> Self {
        Self {
            name: MARKDOWN_TOOL_NAME.to_string(),
            operation_id: operation_id.to_string(),
            description: format!("{}\n\n{}", description, MARKDOWN_NOTE),
            path: MARKDOWN_PATH.to_string(),
            parameters: vec![
                ToolParameter {
                    name: "filing_id".to_string(),
                    wire_name: "filing_id".to_string(),
                    target: ArgumentTarget::Path,
                    param_type: ParamType::Integer,
                    required: true,
                    default: None,
                    description: Some("The ID of the filing to retrieve.".to_string()),
                },
                ToolParameter {
                    name: "offset".to_string(),
                    wire_name: "offset".to_string(),
                    target: ArgumentTarget::Local,
                    param_type: ParamType::Integer,
                    required: false,
                    default: Some(json!(0)),
                    description: Some("Character offset to start reading from (default 0).".to_string()),
                },
                ToolParameter {
                    name: "limit".to_string(),
                    wire_name: "limit".to_string(),
                    target: ArgumentTarget::Local,
                    param_type: ParamType::Integer,
                    required: false,
                    default: Some(json!(MARKDOWN_DEFAULT_LIMIT)),
                    description: Some("Number of characters to read (default 50,000).".to_string()),
                },
            ],
            kind: ToolKind::PaginatedMarkdown,
        }
    }

    /// Names of arguments the caller must supply
    pub fn required_arguments(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// JSON Schema (`type: object`) for the tool's arguments
    pub fn input_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_arguments(),
        })
    }
}

/// Builds the tool list for a parsed document
pub struct ToolCatalog;

impl ToolCatalog {
    /// One tool per GET operation with an operation id, in document order
    pub fn build(spec: &ParsedSpec) -> Vec<ToolDefinition> {
        spec.operations
            .iter()
            .filter_map(|op| {
                let tool = ToolDefinition::from_operation(op);
                if tool.is_none() {
                    debug!("Skipping GET {} without operationId", op.path);
                }
                tool
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationParameter;

    fn operation(id: Option<&str>, path: &str, parameters: Vec<OperationParameter>) -> ApiOperation {
        ApiOperation {
            operation_id: id.map(str::to_string),
            path: path.to_string(),
            summary: None,
            description: None,
            parameters,
        }
    }

    fn param(name: &str, location: ParameterLocation, param_type: ParamType, required: bool) -> OperationParameter {
        OperationParameter {
            name: name.to_string(),
            location,
            param_type,
            required,
            default: None,
            description: None,
        }
    }

    #[test]
    fn test_companies_retrieve_scenario() {
        let op = operation(
            Some("companiesRetrieve"),
            "/companies/{id}/",
            vec![param("id", ParameterLocation::Path, ParamType::Integer, true)],
        );

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.name, "companies_retrieve");
        assert_eq!(tool.kind, ToolKind::Standard);
        assert_eq!(tool.path, "/companies/{id}/");
        assert_eq!(tool.description, "No description available.");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].name, "id");
        assert_eq!(tool.parameters[0].annotation().annotation, "i64");
        assert!(!tool.parameters[0].annotation().is_optional());
    }

    #[test]
    fn test_markdown_operation_gets_paginated_kind() {
        let op = operation(
            Some("filingsMarkdownRetrieve"),
            "/filings/{id}/markdown/",
            vec![param("id", ParameterLocation::Path, ParamType::Integer, true)],
        );

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.kind, ToolKind::PaginatedMarkdown);
        assert_eq!(tool.path, MARKDOWN_PATH);
        assert_eq!(tool.required_arguments(), vec!["filing_id"]);
        assert!(tool.description.contains("client-side pagination"));

        let limit = tool.parameters.iter().find(|p| p.name == "limit").unwrap();
        assert_eq!(limit.effective_default(), Some(&json!(50_000)));
    }

    #[test]
    fn test_catalog_skips_missing_ids() {
        let spec = ParsedSpec {
            title: "T".to_string(),
            version: "1".to_string(),
            servers: vec![],
            operations: vec![
                operation(Some("countriesList"), "/countries/", vec![]),
                operation(None, "/anonymous/", vec![]),
                operation(Some("languagesList"), "/languages/", vec![]),
            ],
        };

        let names: Vec<_> = ToolCatalog::build(&spec).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["countries_list", "languages_list"]);
    }

    #[test]
    fn test_parameter_names_converted_wire_names_kept() {
        let op = operation(
            Some("filingsList"),
            "/filings/",
            vec![param("pageSize", ParameterLocation::Query, ParamType::Integer, false)],
        );

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.parameters[0].name, "page_size");
        assert_eq!(tool.parameters[0].wire_name, "pageSize");
        assert_eq!(tool.parameters[0].target, ArgumentTarget::Query);
    }

    #[test]
    fn test_colliding_parameter_names_keep_first() {
        let op = operation(
            Some("filingsList"),
            "/filings/",
            vec![
                param("pageSize", ParameterLocation::Query, ParamType::Integer, false),
                param("page_size", ParameterLocation::Query, ParamType::String, false),
            ],
        );

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].wire_name, "pageSize");
        assert_eq!(tool.parameters[0].param_type, ParamType::Integer);
    }

    #[test]
    fn test_default_coerced_to_parameter_type() {
        let mut size = param("page_size", ParameterLocation::Query, ParamType::Integer, false);
        size.default = Some(json!("10"));
        let mut bogus = param("page", ParameterLocation::Query, ParamType::Integer, false);
        bogus.default = Some(json!("first"));
        let op = operation(Some("filingsList"), "/filings/", vec![size, bogus]);

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.parameters[0].effective_default(), Some(&json!(10)));
        assert_eq!(tool.parameters[0].annotation().default_expr.as_deref(), Some("Some(10)"));
        assert_eq!(tool.parameters[1].effective_default(), None);
        assert_eq!(tool.input_schema()["properties"]["page_size"]["default"], json!(10));
    }

    #[test]
    fn test_required_default_is_not_effective() {
        let mut p = param("view", ParameterLocation::Query, ParamType::String, true);
        p.default = Some(json!("full"));
        let op = operation(Some("companiesList"), "/companies/", vec![p]);

        let tool = ToolDefinition::from_operation(&op).unwrap();
        assert_eq!(tool.parameters[0].effective_default(), None);
    }

    #[test]
    fn test_input_schema() {
        let mut view = param("view", ParameterLocation::Query, ParamType::String, false);
        view.default = Some(json!("summary"));
        view.description = Some("Level of detail".to_string());
        let op = operation(
            Some("companiesList"),
            "/companies/",
            vec![view, param("search", ParameterLocation::Query, ParamType::Any, false)],
        );

        let schema = ToolDefinition::from_operation(&op).unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["view"]["type"], "string");
        assert_eq!(schema["properties"]["view"]["default"], "summary");
        assert_eq!(schema["properties"]["view"]["description"], "Level of detail");
        assert!(schema["properties"]["search"].get("type").is_none());
        assert_eq!(schema["required"], json!([]));
    }
}
