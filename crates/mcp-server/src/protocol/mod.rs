//! MCP protocol types and handling

mod handler;
mod types;

pub use handler::{RequestHandler, SERVER_NAME};
pub use types::*;
