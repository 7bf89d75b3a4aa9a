//! Template contexts built from tool definitions

use openapi_parser::{ArgumentTarget, ToolDefinition, ToolParameter};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::idents::{pascal_case, raw_string_literal, rust_ident, string_literal};

/// One field of an emitted `*Args` struct
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub ident: String,
    pub rust_type: String,
    /// Contents of `#[serde(...)]`, if any
    pub serde_attr: Option<String>,
    /// Name of the function producing a schema default
    pub default_fn: Option<String>,
    pub default_expr: Option<String>,
    pub doc: Option<String>,
}

/// A field forwarded to the URL path or query string
#[derive(Debug, Clone, Serialize)]
pub struct WireBinding {
    /// Placeholder or query key, as a string literal
    pub wire: String,
    pub ident: String,
}

/// Everything the tool templates need
#[derive(Debug, Clone, Serialize)]
pub struct ToolContext {
    pub fn_name: String,
    pub struct_name: String,
    pub doc_lines: Vec<String>,
    /// URL template as a string literal
    pub path: String,
    pub fields: Vec<FieldContext>,
    pub path_params: Vec<WireBinding>,
    pub query_params: Vec<WireBinding>,
    pub name_literal: String,
    pub description_literal: String,
    pub schema_literal: String,
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn doc_lines(definition: &ToolDefinition) -> Vec<String> {
    let mut lines: Vec<String> = definition
        .description
        .lines()
        .map(|l| l.trim_end().to_string())
        .collect();

    if !definition.parameters.is_empty() {
        lines.push(String::new());
        lines.push("# Arguments".to_string());
        lines.push(String::new());
        for param in &definition.parameters {
            let description = param
                .description
                .as_deref()
                .map(one_line)
                .filter(|d| !d.is_empty());
            lines.push(match description {
                Some(d) => format!("* `{}` - {}", param.name, d),
                None => format!("* `{}`", param.name),
            });
        }
    }
    lines
}

fn field(fn_name: &str, param: &ToolParameter, ident: &str, renamed: bool) -> FieldContext {
    let annotation = param.annotation();
    let mut attrs = Vec::new();
    if renamed {
        attrs.push(format!("rename = {}", string_literal(&param.name)));
    }

    let (default_fn, default_expr) = match annotation.default_expr.as_deref() {
        Some("None") => {
            attrs.push("default".to_string());
            (None, None)
        }
        Some(expr) => {
            let name = format!("{}_{}_default", fn_name, ident.trim_end_matches('_'));
            attrs.push(format!("default = {}", string_literal(&name)));
            (Some(name), Some(expr.to_string()))
        }
        None => (None, None),
    };

    FieldContext {
        ident: ident.to_string(),
        rust_type: annotation.annotation,
        serde_attr: (!attrs.is_empty()).then(|| attrs.join(", ")),
        default_fn,
        default_expr,
        doc: param.description.as_deref().map(one_line).filter(|d| !d.is_empty()),
    }
}

impl ToolContext {
    pub fn from_definition(definition: &ToolDefinition) -> Self {
        let fn_name = rust_ident(&definition.name).ident;

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut path_params = Vec::new();
        let mut query_params = Vec::new();

        for param in &definition.parameters {
            let ident = rust_ident(&param.name);
            if !seen.insert(ident.ident.clone()) {
                warn!(
                    "Tool {}: parameter {} collides with an earlier one, skipping",
                    definition.name, param.wire_name
                );
                continue;
            }

            let binding = WireBinding {
                wire: string_literal(&param.wire_name),
                ident: ident.ident.clone(),
            };
            match param.target {
                ArgumentTarget::Path => path_params.push(binding),
                ArgumentTarget::Query => query_params.push(binding),
                ArgumentTarget::Local => {}
            }

            fields.push(field(&fn_name, param, &ident.ident, ident.renamed));
        }

        Self {
            struct_name: format!("{}Args", pascal_case(&definition.name)),
            fn_name,
            doc_lines: doc_lines(definition),
            path: string_literal(&definition.path),
            fields,
            path_params,
            query_params,
            name_literal: string_literal(&definition.name),
            description_literal: string_literal(&definition.description),
            schema_literal: raw_string_literal(&definition.input_schema().to_string()),
        }
    }
}
