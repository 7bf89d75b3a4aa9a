//! financial-reports-mcp: serve the financial reports API as MCP tools
//!
//! Tools are built from the API's OpenAPI document at startup. In stdio mode
//! the key comes from `API_KEY`; in HTTP mode each caller passes
//! `?api_key=...` on the server URL.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use mcp_server::{McpServer, ServerMode, ToolRegistry};
use openapi_parser::{OpenApiParser, ToolCatalog, DEFAULT_SCHEMA_URL};

/// Financial reports MCP server
#[derive(Parser, Debug)]
#[command(name = "financial-reports-mcp")]
#[command(version)]
#[command(about = "Expose the financial reports API to agents over MCP")]
struct Args {
    /// Run in stdio mode (default)
    #[arg(long, conflicts_with = "http")]
    stdio: bool,

    /// Run in HTTP/SSE mode
    #[arg(long)]
    http: bool,

    /// Port for HTTP server
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// OpenAPI document URL
    #[arg(long, default_value = DEFAULT_SCHEMA_URL, env = "SCHEMA_URL")]
    schema_url: String,

    /// Local OpenAPI document, used instead of --schema-url
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the protocol in stdio mode
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let spec = match &args.schema {
        Some(path) => OpenApiParser::load_file(path)
            .with_context(|| format!("Failed to load schema from {}", path.display()))?,
        None => OpenApiParser::fetch_and_parse(&args.schema_url)
            .await
            .with_context(|| format!("Failed to fetch schema from {}", args.schema_url))?,
    };
    info!("Loaded {} v{} ({} GET operations)", spec.title, spec.version, spec.operations.len());

    let registry = ToolRegistry::from_definitions(ToolCatalog::build(&spec));

    let mode = if args.http {
        ServerMode::Http { port: args.port }
    } else {
        ServerMode::Stdio
    };

    let server = match mode {
        ServerMode::Stdio => McpServer::stdio_from_env(registry)?,
        ServerMode::Http { port } => McpServer::http(registry, port),
    };

    server.run().await?;

    Ok(())
}
