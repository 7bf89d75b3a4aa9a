//! `$ref` resolution for parameters and their schemas

use indexmap::IndexMap;
use serde_json::Value;

use crate::types::{RawComponents, RawParameter};

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const PARAMETER_PREFIX: &str = "#/components/parameters/";

/// Resolves local `$ref` references against the document's components
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, Value>,
    parameters: &'a IndexMap<String, RawParameter>,
    /// Maximum number of references followed, to stop on cycles
    max_depth: usize,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver over the given components
    pub fn new(components: &'a RawComponents) -> Self {
        Self {
            schemas: &components.schemas,
            parameters: &components.parameters,
            max_depth: 10,
        }
    }

    /// Follow a parameter `$ref` to its definition in components/parameters.
    ///
    /// Inline parameters are returned as-is; unknown references give `None`.
    pub fn resolve_parameter<'p>(&'p self, param: &'p RawParameter) -> Option<&'p RawParameter> {
        let mut current = param;
        for _ in 0..=self.max_depth {
            match &current.reference {
                None => return Some(current),
                Some(reference) => {
                    let name = reference.strip_prefix(PARAMETER_PREFIX)?;
                    current = self.parameters.get(name)?;
                }
            }
        }
        None
    }

    /// Resolve a parameter schema far enough to read its type and default.
    ///
    /// Follows `$ref` chains and unwraps single-element `allOf` wrappers.
    /// Sibling keys next to a wrapper (such as `default`) take precedence
    /// over the referenced schema.
    pub fn resolve(&self, schema: &Value) -> Value {
        self.resolve_with_depth(schema, 0)
    }

    fn resolve_with_depth(&self, schema: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return schema.clone();
        }

        let Some(obj) = schema.as_object() else {
            return schema.clone();
        };

        let target = if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            reference
                .strip_prefix(SCHEMA_PREFIX)
                .and_then(|name| self.schemas.get(name))
        } else {
            match obj.get("allOf").and_then(Value::as_array) {
                Some(parts) if parts.len() == 1 => parts.first(),
                _ => None,
            }
        };

        let Some(target) = target else {
            return schema.clone();
        };

        let mut resolved = match self.resolve_with_depth(target, depth + 1) {
            Value::Object(map) => map,
            other => return other,
        };
        for (key, value) in obj {
            if key != "$ref" && key != "allOf" {
                resolved.insert(key.clone(), value.clone());
            }
        }
        Value::Object(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components() -> RawComponents {
        let mut components = RawComponents::default();
        components.schemas.insert(
            "ViewEnum".to_string(),
            json!({"type": "string", "enum": ["summary", "full"]}),
        );
        components.schemas.insert(
            "Alias".to_string(),
            json!({"$ref": "#/components/schemas/ViewEnum"}),
        );
        components.parameters.insert(
            "Page".to_string(),
            RawParameter {
                name: "page".to_string(),
                location: "query".to_string(),
                required: false,
                description: Some("A page number".to_string()),
                schema: Some(json!({"type": "integer"})),
                reference: None,
            },
        );
        components
    }

    #[test]
    fn test_resolve_simple_ref() {
        let components = components();
        let resolver = SchemaResolver::new(&components);

        let resolved = resolver.resolve(&json!({"$ref": "#/components/schemas/ViewEnum"}));
        assert_eq!(resolved["type"], "string");
    }

    #[test]
    fn test_resolve_chained_ref() {
        let components = components();
        let resolver = SchemaResolver::new(&components);

        let resolved = resolver.resolve(&json!({"$ref": "#/components/schemas/Alias"}));
        assert_eq!(resolved["type"], "string");
    }

    #[test]
    fn test_resolve_allof_keeps_sibling_default() {
        let components = components();
        let resolver = SchemaResolver::new(&components);

        let resolved = resolver.resolve(&json!({
            "allOf": [{"$ref": "#/components/schemas/ViewEnum"}],
            "default": "summary"
        }));
        assert_eq!(resolved["type"], "string");
        assert_eq!(resolved["default"], "summary");
        assert!(resolved.get("allOf").is_none());
    }

    #[test]
    fn test_unknown_ref_is_left_alone() {
        let components = components();
        let resolver = SchemaResolver::new(&components);

        let schema = json!({"$ref": "#/components/schemas/Missing"});
        assert_eq!(resolver.resolve(&schema), schema);
    }

    #[test]
    fn test_cyclic_ref_terminates() {
        let mut components = RawComponents::default();
        components
            .schemas
            .insert("Loop".to_string(), json!({"$ref": "#/components/schemas/Loop"}));
        let resolver = SchemaResolver::new(&components);

        let resolved = resolver.resolve(&json!({"$ref": "#/components/schemas/Loop"}));
        assert!(resolved.get("$ref").is_some());
    }

    #[test]
    fn test_resolve_parameter_ref() {
        let components = components();
        let resolver = SchemaResolver::new(&components);

        let param = RawParameter {
            name: String::new(),
            location: String::new(),
            required: false,
            description: None,
            schema: None,
            reference: Some("#/components/parameters/Page".to_string()),
        };
        let resolved = resolver.resolve_parameter(&param).unwrap();
        assert_eq!(resolved.name, "page");
        assert_eq!(resolved.location, "query");
    }
}
