//! Error types for the tool runtime

use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Runtime error types.
///
/// These only surface at startup or in transports. Failures inside a tool
/// invocation are returned to the caller as text instead.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("API_KEY environment variable not set.")]
    MissingApiKey,

    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to load OpenAPI spec: {0}")]
    Spec(#[from] openapi_parser::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
