//! # mcp-server
//!
//! MCP tool runtime for the financial reports API. Tools are either
//! interpreted from the OpenAPI document at startup or registered by a
//! generated server through [`FnTool`]. Supports stdio and HTTP/SSE
//! transports.

mod context;
pub mod error;
pub mod format;
pub mod protocol;
pub mod request;
mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use context::RequestContext;
pub use error::{Result, RuntimeError};
pub use format::{format_body, format_response, MarkdownPage};
pub use protocol::{McpError, McpMessage, McpTool, ServerCapabilities};
pub use request::{InvalidPathValue, PathParams, QueryParams};
pub use server::{McpServer, ServerMode};
pub use session::{ApiKey, ApiSession, SessionConfig, SessionSource};
pub use tools::{BindError, FnTool, ToolExecutor, ToolGenerator, ToolHandler, ToolRegistry};
pub use transport::{HttpTransport, StdioTransport};
