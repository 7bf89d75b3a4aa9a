//! generate-mcp-tools: render MCP server sources from the API's OpenAPI document

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use mcp_codegen::{ServerAssembler, Variant};
use openapi_parser::{OpenApiParser, DEFAULT_SCHEMA_URL};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Stdio,
    Worker,
    All,
}

impl VariantArg {
    fn variants(self) -> Vec<Variant> {
        match self {
            Self::Stdio => vec![Variant::Stdio],
            Self::Worker => vec![Variant::Worker],
            Self::All => Variant::ALL.to_vec(),
        }
    }
}

/// Generate MCP tool servers from the financial reports OpenAPI document
#[derive(Parser, Debug)]
#[command(name = "generate-mcp-tools")]
#[command(version)]
struct Args {
    /// OpenAPI document URL
    #[arg(long, default_value = DEFAULT_SCHEMA_URL, env = "SCHEMA_URL")]
    schema_url: String,

    /// Local OpenAPI document, used instead of --schema-url
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Which server files to write
    #[arg(long, value_enum, default_value = "all")]
    variant: VariantArg,

    /// Directory receiving `stdio.rs` / `worker.rs`
    #[arg(long, default_value = "generated/src")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (spec, source) = match &args.schema {
        Some(path) => {
            let spec = OpenApiParser::load_file(path)
                .with_context(|| format!("Failed to load schema from {}", path.display()))?;
            (spec, path.display().to_string())
        }
        None => {
            let spec = OpenApiParser::fetch_and_parse(&args.schema_url)
                .await
                .with_context(|| format!("Failed to fetch schema from {}", args.schema_url))?;
            (spec, args.schema_url.clone())
        }
    };
    info!("Parsed {} v{}: {} GET operations", spec.title, spec.version, spec.operations.len());

    let assembler = ServerAssembler::new()?;
    for variant in args.variant.variants() {
        let path = assembler
            .write(&spec, variant, &source, &args.output_dir)
            .with_context(|| format!("Failed to generate {} variant", variant))?;
        println!("Generated {}", path.display());
    }

    Ok(())
}
