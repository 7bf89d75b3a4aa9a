//! Main OpenAPI parser

use crate::error::{ParseError, ParseResult};
use crate::operations::OperationExtractor;
use crate::types::*;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Schema published by the financial reports API
pub const DEFAULT_SCHEMA_URL: &str = "https://financialreports.eu/api/schema/";

/// OpenAPI 3.x parser
pub struct OpenApiParser;

impl OpenApiParser {
    /// Parse a schema document, JSON when it starts with `{` and YAML otherwise
    pub fn parse(content: &str) -> ParseResult<ParsedSpec> {
        if content.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        if content.trim_start().starts_with('{') {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    /// Parse a JSON schema document
    pub fn parse_json(content: &str) -> ParseResult<ParsedSpec> {
        let raw_spec: RawOpenApiSpec = serde_json::from_str(content)?;
        Self::convert_spec(raw_spec)
    }

    /// Parse a YAML schema document
    pub fn parse_yaml(content: &str) -> ParseResult<ParsedSpec> {
        let raw_spec: RawOpenApiSpec = serde_yaml::from_str(content)?;
        Self::convert_spec(raw_spec)
    }

    /// Read and parse a schema document from a local file
    pub fn load_file(path: &Path) -> ParseResult<ParsedSpec> {
        info!("Loading schema from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Fetch and parse the schema document at `url`.
    ///
    /// Fails on network errors and non-success statuses; there is no retry.
    pub async fn fetch_and_parse(url: &str) -> ParseResult<ParsedSpec> {
        let parsed_url = url::Url::parse(url).map_err(|e| ParseError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        info!("Fetching schema from {}", parsed_url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ParseError::Client(e.to_string()))?;

        let response = client
            .get(parsed_url.clone())
            .header("Accept", "application/json, application/yaml, application/vnd.oai.openapi")
            .send()
            .await
            .map_err(|e| ParseError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ParseError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let content = response
            .text()
            .await
            .map_err(|e| ParseError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        debug!("Fetched {} bytes ({})", content.len(), content_type);

        let path = parsed_url.path();
        if content_type.contains("yaml") || path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::parse_yaml(&content)
        } else if content_type.contains("json") {
            Self::parse_json(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// Check the version and extract GET operations
    fn convert_spec(raw: RawOpenApiSpec) -> ParseResult<ParsedSpec> {
        if !raw.openapi.starts_with("3.") {
            return Err(ParseError::UnsupportedVersion(raw.openapi));
        }

        debug!("Parsing OpenAPI {} document: {}", raw.openapi, raw.info.title);

        let operations = OperationExtractor::extract(&raw)?;

        debug!("Extracted {} GET operations", operations.len());

        let servers = raw
            .servers
            .iter()
            .map(|s| ServerInfo {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();

        Ok(ParsedSpec {
            title: raw.info.title,
            version: raw.info.version,
            servers,
            operations,
        })
    }
}
