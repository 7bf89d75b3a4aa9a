//! # mcp-codegen
//!
//! Renders Rust MCP servers for the financial reports API from its OpenAPI
//! document. Each GET operation becomes a typed `*Args` struct plus an async
//! tool function built on the `mcp-server` runtime; the assembled file also
//! registers every tool and carries a `main` for its deployment variant.

mod assembler;
mod context;
mod emitter;
mod error;
mod idents;

pub use assembler::{ServerAssembler, Variant, DEFAULT_PORT};
pub use context::{FieldContext, ToolContext, WireBinding};
pub use emitter::ToolEmitter;
pub use error::{CodegenError, CodegenResult};
