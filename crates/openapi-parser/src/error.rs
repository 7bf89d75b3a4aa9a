//! Errors raised while loading a schema document

use std::path::PathBuf;
use thiserror::Error;

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Any of these aborts a generation run
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid schema URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to fetch schema from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Schema request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read schema file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema document is empty")]
    EmptyDocument,

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported OpenAPI version {0}, expected 3.x")]
    UnsupportedVersion(String),
}
