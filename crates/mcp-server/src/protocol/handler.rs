//! MCP request handler

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::*;
use crate::context::RequestContext;
use crate::tools::{BindError, ToolExecutor, ToolRegistry};
use crate::session::SessionSource;

/// Name reported in `initialize`
pub const SERVER_NAME: &str = "financial-reports";

/// Handler for MCP requests
pub struct RequestHandler {
    /// Tool executor
    tool_executor: ToolExecutor,
    /// Server name
    server_name: String,
    /// Server version
    server_version: String,
    /// Whether a client has completed `initialize`
    initialized: AtomicBool,
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(registry: Arc<ToolRegistry>, sessions: SessionSource) -> Self {
        Self {
            tool_executor: ToolExecutor::new(registry, sessions),
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Handle an incoming message
    pub async fn handle(&self, message: McpMessage, ctx: &RequestContext) -> Option<McpMessage> {
        match (message.method.as_deref(), message.id.clone()) {
            (Some(method), Some(id)) => {
                debug!("Handling request: {}", method);

                let result = match method {
                    "initialize" => self.handle_initialize(message.params),
                    "ping" => Ok(serde_json::json!({})),
                    "tools/list" => self.handle_tools_list(),
                    "tools/call" => self.handle_tools_call(message.params, ctx).await,
                    _ => Err(McpError::method_not_found()),
                };

                Some(match result {
                    Ok(result) => McpMessage::response(id, result),
                    Err(error) => McpMessage::error_response(Some(id), error),
                })
            }
            (Some(method), None) => {
                match method {
                    "notifications/initialized" | "initialized" => info!("Client initialized"),
                    "notifications/cancelled" => debug!("Request cancelled"),
                    _ => debug!("Unknown notification: {}", method),
                }
                None
            }
            (None, _) => {
                // Responses are not expected in server mode
                debug!("Received unexpected response");
                None
            }
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_params(e.to_string()))?
            .unwrap_or_default();

        match &params.client_info {
            Some(client) => info!(
                "Initializing session with client: {} v{} (protocol {})",
                client.name,
                client.version,
                params.protocol_version.as_deref().unwrap_or("unspecified")
            ),
            None => info!("Initializing session with an unnamed client"),
        }

        self.initialized.store(true, Ordering::Relaxed);

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
        };

        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let result = ToolsListResult {
            tools: self.tool_executor.registry().list(),
        };
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }

    async fn handle_tools_call(
        &self,
        params: Option<Value>,
        ctx: &RequestContext,
    ) -> Result<Value, McpError> {
        let params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_params(e.to_string()))?
            .ok_or_else(|| McpError::invalid_params("Missing params"))?;

        debug!("Calling tool: {}", params.name);

        let result = self
            .tool_executor
            .execute(&params.name, params.arguments, ctx)
            .await
            .map_err(|e: BindError| {
                warn!("Rejected call to {}: {}", params.name, e);
                McpError::from(e)
            })?;

        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }
}
