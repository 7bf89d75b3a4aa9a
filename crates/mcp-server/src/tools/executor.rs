//! Execute MCP tools by making HTTP requests

use async_trait::async_trait;
use openapi_parser::{ArgumentTarget, ToolDefinition, ToolKind, MARKDOWN_DEFAULT_LIMIT};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::binding::{bind_arguments, BindError, BoundArguments};
use super::generator::ToolGenerator;
use super::registry::{ToolHandler, ToolRegistry};
use crate::context::RequestContext;
use crate::protocol::{McpTool, ToolCallResult};
use crate::format::{ERROR_CALLING_API, ERROR_RETRIEVING_MARKDOWN};
use crate::request::{InvalidPathValue, PathParams, QueryParams};
use crate::session::{ApiSession, SessionSource};

/// A tool interpreted from its [`ToolDefinition`] at runtime
pub struct OperationTool {
    definition: ToolDefinition,
    tool: McpTool,
}

impl OperationTool {
    pub fn new(definition: ToolDefinition) -> Self {
        let tool = ToolGenerator::generate_tool(&definition);
        Self { definition, tool }
    }

    /// Split bound arguments into the URL path and the query string
    fn build_request(&self, bound: &BoundArguments) -> Result<(String, QueryParams), InvalidPathValue> {
        let mut path = PathParams::new();
        let mut query = QueryParams::new();

        for param in &self.definition.parameters {
            let value = bound.get(&param.name);
            match param.target {
                ArgumentTarget::Path => path.push_value(&param.wire_name, value),
                ArgumentTarget::Query => query.push_value(&param.wire_name, value),
                ArgumentTarget::Local => {}
            }
        }

        Ok((path.render(&self.definition.path)?, query))
    }

    async fn run(&self, session: &ApiSession, bound: &BoundArguments) -> String {
        let (path, query) = match self.build_request(bound) {
            Ok(request) => request,
            Err(e) => {
                warn!("Refusing to call {}: {}", self.definition.name, e);
                let prefix = match self.definition.kind {
                    ToolKind::Standard => ERROR_CALLING_API,
                    ToolKind::PaginatedMarkdown => ERROR_RETRIEVING_MARKDOWN,
                };
                return format!("{}{}", prefix, e);
            }
        };
        match self.definition.kind {
            ToolKind::Standard => session.call_json(&path, &query).await,
            ToolKind::PaginatedMarkdown => {
                let offset = bound.int_or("offset", 0);
                let limit = bound.int_or("limit", MARKDOWN_DEFAULT_LIMIT);
                session.call_markdown(&path, offset, limit).await
            }
        }
    }
}

#[async_trait]
impl ToolHandler for OperationTool {
    fn tool(&self) -> &McpTool {
        &self.tool
    }

    async fn call(
        &self,
        sessions: &SessionSource,
        ctx: &RequestContext,
        arguments: Option<Value>,
    ) -> Result<String, BindError> {
        let bound = bind_arguments(&self.definition, arguments)?;

        // The per-request session is dropped when this returns
        let session = match sessions.acquire(ctx.api_key.as_ref()) {
            Ok(session) => session,
            Err(text) => return Ok(text),
        };
        Ok(self.run(&session, &bound).await)
    }
}

/// Executor for MCP tools
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    sessions: SessionSource,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, sessions: SessionSource) -> Self {
        Self { registry, sessions }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool by name
    pub async fn execute(
        &self,
        tool_name: &str,
        arguments: Option<Value>,
        ctx: &RequestContext,
    ) -> Result<ToolCallResult, BindError> {
        let handler = self
            .registry
            .get(tool_name)
            .ok_or_else(|| BindError::UnknownTool(tool_name.to_string()))?;

        debug!("Executing tool: {}", tool_name);
        let text = handler.call(&self.sessions, ctx, arguments).await?;
        info!("Tool {} returned {} chars", tool_name, text.chars().count());

        Ok(ToolCallResult::text(text))
    }
}
