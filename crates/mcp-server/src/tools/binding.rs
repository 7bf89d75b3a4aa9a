//! Bind caller arguments to a tool's declared parameters

use indexmap::IndexMap;
use openapi_parser::{ParamType, ToolDefinition};
use serde_json::Value;
use thiserror::Error;

/// Rejections that happen before a tool runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Arguments must be an object")]
    NotAnObject,

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Argument '{name}' must be of type {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

static NULL: Value = Value::Null;

fn type_label(param_type: ParamType) -> &'static str {
    param_type.schema_name().unwrap_or("any")
}

/// Arguments after defaults are applied, keyed by parameter name.
///
/// Every declared parameter has an entry; an omitted optional parameter
/// without a default is `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: IndexMap<String, Value>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    /// Integer argument, or `fallback` when absent
    pub fn int_or(&self, name: &str, fallback: i64) -> i64 {
        self.get(name).as_i64().unwrap_or(fallback)
    }
}

/// Check `arguments` against the definition and fill in defaults.
///
/// Arguments not declared by the tool are ignored. An explicit `null` for an
/// optional parameter counts as absent and does not pick up the default.
pub fn bind_arguments(
    definition: &ToolDefinition,
    arguments: Option<Value>,
) -> Result<BoundArguments, BindError> {
    let mut provided = match arguments {
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(BindError::NotAnObject),
    };

    let mut values = IndexMap::with_capacity(definition.parameters.len());
    for param in &definition.parameters {
        let value = match provided.remove(&param.name) {
            Some(Value::Null) if param.required && param.param_type != ParamType::Any => {
                return Err(BindError::TypeMismatch {
                    name: param.name.clone(),
                    expected: type_label(param.param_type).to_string(),
                });
            }
            Some(Value::Null) => Value::Null,
            Some(value) if param.param_type.accepts(&value) => value,
            Some(_) => {
                return Err(BindError::TypeMismatch {
                    name: param.name.clone(),
                    expected: type_label(param.param_type).to_string(),
                });
            }
            None if param.required => {
                return Err(BindError::MissingArgument(param.name.clone()));
            }
            None => param.effective_default().cloned().unwrap_or(Value::Null),
        };
        values.insert(param.name.clone(), value);
    }

    Ok(BoundArguments { values })
}
