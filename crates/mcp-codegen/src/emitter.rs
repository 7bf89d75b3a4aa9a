//! Render tool blocks and file sections with tera

use openapi_parser::{ToolDefinition, ToolKind, MARKDOWN_DEFAULT_LIMIT};
use serde::Serialize;
use tera::{Context, Tera};

use crate::context::ToolContext;
use crate::error::CodegenResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("header.rs", include_str!("../templates/header.rs.tera")),
    ("tool.rs", include_str!("../templates/tool.rs.tera")),
    ("markdown_tool.rs", include_str!("../templates/markdown_tool.rs.tera")),
    ("register.rs", include_str!("../templates/register.rs.tera")),
    ("footer.rs", include_str!("../templates/footer.rs.tera")),
];

/// Template renderer for generated servers
pub struct ToolEmitter {
    tera: Tera,
}

impl ToolEmitter {
    /// Load the built-in templates
    pub fn new() -> CodegenResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render a named template with a serializable context
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> CodegenResult<String> {
        let context = Context::from_serialize(context)?;
        Ok(self.tera.render(template, &context)?)
    }

    /// Source block for one tool: args struct, defaults, async fn
    pub fn emit_tool(&self, definition: &ToolDefinition) -> CodegenResult<String> {
        let tool = ToolContext::from_definition(definition);
        match definition.kind {
            ToolKind::Standard => self.render("tool.rs", &tool),
            ToolKind::PaginatedMarkdown => {
                let mut context = Context::from_serialize(&tool)?;
                context.insert("default_limit", &MARKDOWN_DEFAULT_LIMIT);
                Ok(self.tera.render("markdown_tool.rs", &context)?)
            }
        }
    }
}
