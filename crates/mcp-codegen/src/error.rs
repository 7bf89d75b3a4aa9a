//! Error types for code generation

use thiserror::Error;

/// Result type alias for code generation
pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to load OpenAPI spec: {0}")]
    Spec(#[from] openapi_parser::ParseError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
