//! Operation extraction from OpenAPI specs

use crate::error::ParseResult;
use crate::mapping::ParamType;
use crate::resolver::SchemaResolver;
use crate::types::*;
use tracing::{debug, warn};

/// Extracts GET operations from raw OpenAPI spec structures
pub struct OperationExtractor;

impl OperationExtractor {
    /// Extract every GET operation, in document path order
    pub fn extract(spec: &RawOpenApiSpec) -> ParseResult<Vec<ApiOperation>> {
        let empty_components = RawComponents::default();
        let components = spec.components.as_ref().unwrap_or(&empty_components);
        let resolver = SchemaResolver::new(components);

        let mut operations = Vec::new();

        for (path, path_item) in &spec.paths {
            let Some(op) = &path_item.get else {
                continue;
            };

            let path_params: Vec<OperationParameter> = path_item
                .parameters
                .iter()
                .filter_map(|p| Self::convert_parameter(p, &resolver))
                .collect();

            operations.push(Self::extract_operation(path, op, &path_params, &resolver));
        }

        Ok(operations)
    }

    /// Extract a single GET operation
    fn extract_operation(
        path: &str,
        operation: &RawOperation,
        path_params: &[OperationParameter],
        resolver: &SchemaResolver,
    ) -> ApiOperation {
        // Operation-level parameters override path-level ones with the same name
        let mut parameters = path_params.to_vec();
        for param in &operation.parameters {
            if let Some(p) = Self::convert_parameter(param, resolver) {
                parameters.retain(|existing| existing.name != p.name);
                parameters.push(p);
            }
        }

        ApiOperation {
            operation_id: operation
                .operation_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
            path: path.to_string(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            parameters,
        }
    }

    /// Convert a raw parameter, dropping header/cookie parameters and
    /// unresolvable references
    fn convert_parameter(param: &RawParameter, resolver: &SchemaResolver) -> Option<OperationParameter> {
        let Some(param) = resolver.resolve_parameter(param) else {
            debug!("Skipping unresolvable parameter reference: {:?}", param.reference);
            return None;
        };

        let Some(location) = ParameterLocation::from_openapi(&param.location) else {
            debug!("Skipping {} parameter: {}", param.location, param.name);
            return None;
        };

        let schema = param.schema.as_ref().map(|s| resolver.resolve(s));
        let param_type = ParamType::from_schema(schema.as_ref());
        let default = schema
            .as_ref()
            .and_then(|s| s.get("default"))
            .filter(|v| !v.is_null())
            .and_then(|v| {
                let coerced = param_type.coerce_default(v);
                if coerced.is_none() {
                    warn!("Dropping default {} of parameter {}: not a {:?}", v, param.name, param_type);
                }
                coerced
            });

        Some(OperationParameter {
            name: param.name.clone(),
            location,
            param_type,
            required: param.required || location == ParameterLocation::Path,
            default,
            description: param
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}
