//! Schema document types: raw deserialization targets and extracted operations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mapping::ParamType;

/// Where a parameter is sent in the outbound request.
///
/// Header and cookie parameters are dropped during extraction; the upstream
/// API only takes path and query arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

impl ParameterLocation {
    /// Parse the `in` field of an OpenAPI parameter
    pub fn from_openapi(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            _ => None,
        }
    }
}

/// A parameter for an API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
    /// Parameter name as written in the schema
    pub name: String,
    /// Where the parameter is located
    pub location: ParameterLocation,
    /// Primitive type tag from the parameter schema
    pub param_type: ParamType,
    /// Whether the parameter is required
    pub required: bool,
    /// Schema-level default value
    pub default: Option<serde_json::Value>,
    /// Parameter description
    pub description: Option<String>,
}

/// A single GET operation extracted from the OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOperation {
    /// Operation ID from the document; operations without one produce no tool
    pub operation_id: Option<String>,
    /// URL path template (e.g., "/companies/{id}/")
    pub path: String,
    /// Short summary
    pub summary: Option<String>,
    /// Full description
    pub description: Option<String>,
    /// Path and query parameters, path-level parameters first
    pub parameters: Vec<OperationParameter>,
}

/// Parsed OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSpec {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// Server URLs
    pub servers: Vec<ServerInfo>,
    /// GET operations in document path order
    pub operations: Vec<ApiOperation>,
}

/// Server entry of the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server URL
    pub url: String,
    /// Server description
    pub description: Option<String>,
}

// --- Raw OpenAPI 3.x structures for parsing ---

/// Raw OpenAPI document structure
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpenApiSpec {
    pub openapi: String,
    pub info: RawInfo,
    #[serde(default)]
    pub servers: Vec<RawServer>,
    #[serde(default)]
    pub paths: IndexMap<String, RawPathItem>,
    #[serde(default)]
    pub components: Option<RawComponents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawServer {
    pub url: String,
    pub description: Option<String>,
}

/// Path item; only GET operations are read
#[derive(Debug, Clone, Deserialize)]
pub struct RawPathItem {
    pub get: Option<RawOperation>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    /// Parameter name (empty when $ref is used)
    #[serde(default)]
    pub name: String,
    /// Parameter location (empty when $ref is used)
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
    /// Reference to a parameter in components/parameters
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComponents {
    #[serde(default)]
    pub schemas: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub parameters: IndexMap<String, RawParameter>,
}
