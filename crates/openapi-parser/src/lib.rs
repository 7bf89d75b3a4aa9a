//! # openapi-parser
//!
//! OpenAPI 3.x schema fetcher for the financial-reports MCP generator.
//! Extracts GET operations from a provider schema, maps identifiers and
//! primitive types, and builds the tool catalog shared by the code generator
//! and the runtime server.

mod types;
mod parser;
mod operations;
mod resolver;
mod naming;
mod mapping;
mod catalog;
mod error;

pub use types::*;
pub use parser::{OpenApiParser, DEFAULT_SCHEMA_URL};
pub use operations::OperationExtractor;
pub use naming::to_snake_case;
pub use mapping::{ParamType, TypeAnnotation};
pub use catalog::{
    ArgumentTarget, ToolCatalog, ToolDefinition, ToolKind, ToolParameter, MARKDOWN_DEFAULT_LIMIT,
    MARKDOWN_PATH, MARKDOWN_TOOL_NAME,
};
pub use error::{ParseError, ParseResult};
