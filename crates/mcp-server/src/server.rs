//! Wires a tool registry and a session source to one transport

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::protocol::RequestHandler;
use crate::session::{ApiKey, ApiSession, SessionConfig, SessionSource};
use crate::tools::ToolRegistry;
use crate::transport::{HttpTransport, StdioTransport};

/// Transport choice; each implies how API sessions are created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// stdio transport with one process-wide API session
    #[default]
    Stdio,
    /// HTTP/SSE transport with a session per invocation
    Http { port: u16 },
}

/// A ready-to-run server around a fixed tool registry
pub struct McpServer {
    handler: Arc<RequestHandler>,
    mode: ServerMode,
}

impl McpServer {
    /// Stdio mode by default; see [`McpServer::with_mode`]
    pub fn new(registry: ToolRegistry, sessions: SessionSource) -> Self {
        info!("Serving {} tools", registry.len());
        Self {
            handler: Arc::new(RequestHandler::new(Arc::new(registry), sessions)),
            mode: ServerMode::default(),
        }
    }

    /// Stdio server: key from `API_KEY`, base URL from `API_BASE_URL`.
    ///
    /// Fails when `API_KEY` is unset.
    pub fn stdio_from_env(registry: ToolRegistry) -> Result<Self> {
        let api_key = ApiKey::from_env()?;
        let session = ApiSession::new(&SessionConfig::stdio_from_env(), &api_key)?;
        Ok(Self::new(registry, SessionSource::Shared(Arc::new(session))).with_mode(ServerMode::Stdio))
    }

    /// HTTP server taking the key from each request
    pub fn http(registry: ToolRegistry, port: u16) -> Self {
        Self::new(registry, SessionSource::PerRequest(SessionConfig::worker()))
            .with_mode(ServerMode::Http { port })
    }

    pub fn with_mode(mut self, mode: ServerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Serve until stdin closes or the listener fails
    pub async fn run(&self) -> Result<()> {
        match self.mode {
            ServerMode::Stdio => {
                info!("Starting MCP server in stdio mode");
                StdioTransport::new(self.handler.clone()).run().await
            }
            ServerMode::Http { port } => {
                info!("Starting MCP server in HTTP mode on port {}", port);
                HttpTransport::new(self.handler.clone(), port).run().await
            }
        }
    }
}
