//! Assemble and write complete server files

use openapi_parser::{ParsedSpec, ToolCatalog, ToolDefinition};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::context::ToolContext;
use crate::emitter::ToolEmitter;
use crate::error::CodegenResult;

/// Port the worker variant listens on when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Deployment variant of a generated server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Local process speaking MCP over stdio, one shared API session
    Stdio,
    /// Network service with a session per invocation
    Worker,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Stdio, Variant::Worker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Worker => "worker",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.rs", self.as_str())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct FileContext<'a> {
    title: &'a str,
    variant: Variant,
    source: &'a str,
    default_port: u16,
    tools: &'a [ToolContext],
}

/// Builds one server file from a parsed spec
pub struct ServerAssembler {
    emitter: ToolEmitter,
}

impl ServerAssembler {
    pub fn new() -> CodegenResult<Self> {
        Ok(Self {
            emitter: ToolEmitter::new()?,
        })
    }

    /// Header, every tool block in schema order, registration, footer;
    /// joined by newlines. `source` names where the schema came from.
    pub fn assemble(&self, spec: &ParsedSpec, variant: Variant, source: &str) -> CodegenResult<String> {
        self.render_file(spec, &ToolCatalog::build(spec), variant, source)
    }

    fn render_file(
        &self,
        spec: &ParsedSpec,
        definitions: &[ToolDefinition],
        variant: Variant,
        source: &str,
    ) -> CodegenResult<String> {
        let tools: Vec<ToolContext> = definitions.iter().map(ToolContext::from_definition).collect();

        let file = FileContext {
            title: &spec.title,
            variant,
            source,
            default_port: DEFAULT_PORT,
            tools: &tools,
        };

        let mut sections = vec![self.emitter.render("header.rs", &file)?];
        for definition in definitions {
            sections.push(self.emitter.emit_tool(definition)?);
        }
        sections.push(self.emitter.render("register.rs", &file)?);
        sections.push(self.emitter.render("footer.rs", &file)?);

        Ok(sections.join("\n"))
    }

    /// Assemble and write `<output_dir>/<variant>.rs`, replacing any previous file
    pub fn write(
        &self,
        spec: &ParsedSpec,
        variant: Variant,
        source: &str,
        output_dir: &Path,
    ) -> CodegenResult<PathBuf> {
        let definitions = ToolCatalog::build(spec);
        let code = self.render_file(spec, &definitions, variant, source)?;

        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(variant.file_name());
        std::fs::write(&path, code)?;

        info!(
            "Generated {} variant with {} tools at {}",
            variant,
            definitions.len(),
            path.display()
        );
        Ok(path)
    }
}
