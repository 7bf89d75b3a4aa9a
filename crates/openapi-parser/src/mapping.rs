//! Schema primitive types and their Rust parameter annotations

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive type tag of a parameter schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
    /// Absent or unrecognized schema type
    Any,
}

impl ParamType {
    /// Read the primitive type from a (resolved) parameter schema.
    ///
    /// OpenAPI 3.1 type lists such as `["string", "null"]` use their first
    /// non-null entry.
    pub fn from_schema(schema: Option<&Value>) -> Self {
        let type_value = schema.and_then(|s| s.get("type"));
        let name = match type_value {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None,
        };
        name.map(Self::from_name).unwrap_or(Self::Any)
    }

    /// Map a schema type name
    pub fn from_name(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            _ => Self::Any,
        }
    }

    /// The schema type name, or `None` for [`ParamType::Any`]
    pub fn schema_name(&self) -> Option<&'static str> {
        match self {
            Self::Integer => Some("integer"),
            Self::Number => Some("number"),
            Self::String => Some("string"),
            Self::Boolean => Some("boolean"),
            Self::Array => Some("array"),
            Self::Object => Some("object"),
            Self::Any => None,
        }
    }

    /// Rust type used for a value of this schema type
    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::Integer => "i64",
            Self::Number => "f64",
            Self::String => "String",
            Self::Boolean => "bool",
            Self::Array => "Vec<serde_json::Value>",
            Self::Object => "serde_json::Map<String, serde_json::Value>",
            Self::Any => "serde_json::Value",
        }
    }

    /// Check whether a JSON value has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    /// Convert a schema default to this type.
    ///
    /// Numeric strings become numbers, scalars become strings for `String`,
    /// `"true"`/`"false"` become booleans. `None` when no conversion exists.
    pub fn coerce_default(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => None,
            (Self::Any, v) => Some(v.clone()),
            (_, v) if self.accepts(v) => Some(v.clone()),
            (Self::Integer, Value::Number(n)) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64)),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Boolean, Value::String(s)) => match s.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Render a JSON value as a Rust expression of [`ParamType::rust_type`].
    ///
    /// Expects a value already passed through [`ParamType::coerce_default`].
    pub fn render_literal(&self, value: &Value) -> String {
        match (self, value) {
            (Self::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            (Self::Number, Value::Number(n)) => {
                let text = n.to_string();
                if text.contains(['.', 'e', 'E']) {
                    text
                } else {
                    format!("{}.0", text)
                }
            }
            (Self::String, Value::String(s)) => format!("{:?}.to_string()", s),
            (Self::Boolean, Value::Bool(b)) => b.to_string(),
            _ => format!(
                "serde_json::from_str::<{}>({}).unwrap_or_default()",
                self.rust_type(),
                raw_string(&value.to_string())
            ),
        }
    }
}

/// `r"..."` with enough `#`s that no `"#...` run inside ends it early
fn raw_string(text: &str) -> String {
    let mut longest = 0;
    let mut current: Option<usize> = None;
    for c in text.chars() {
        current = match (c, current) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = current {
            longest = longest.max(n);
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

/// A parameter's type annotation and default expression in emitted code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAnnotation {
    /// Full annotation, e.g. `Option<String>`
    pub annotation: String,
    /// Default expression; `None` means the caller must supply the value
    pub default_expr: Option<String>,
}

impl TypeAnnotation {
    /// Map a parameter to its annotation.
    ///
    /// Optional parameters become `Option<T>` defaulting to `None`, or to
    /// `Some(<literal>)` when the schema carries a default. Required
    /// parameters never get a default, even if the schema declares one.
    pub fn for_parameter(param_type: ParamType, required: bool, default: Option<&Value>) -> Self {
        let base = param_type.rust_type();
        if required {
            return Self {
                annotation: base.to_string(),
                default_expr: None,
            };
        }

        let default_expr = match default.and_then(|v| param_type.coerce_default(v)) {
            Some(value) => format!("Some({})", param_type.render_literal(&value)),
            None => "None".to_string(),
        };

        Self {
            annotation: format!("Option<{}>", base),
            default_expr: Some(default_expr),
        }
    }

    /// Whether the parameter can be omitted by the caller
    pub fn is_optional(&self) -> bool {
        self.default_expr.is_some()
    }
}
