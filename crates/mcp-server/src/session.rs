//! Outbound API sessions
//!
//! An [`ApiSession`] is one HTTP client bound to the API base URL with the
//! caller's key and a fixed user agent. The stdio server builds one at startup
//! and shares it; the HTTP server builds one per tool invocation from the key
//! carried by the inbound request and drops it when the invocation ends.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::{Result, RuntimeError};
use crate::format::{
    format_response, MarkdownPage, ERROR_CALLING_API, ERROR_RETRIEVING_MARKDOWN,
};
use crate::request::QueryParams;

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.financialreports.eu";

/// Environment variable holding the stdio server's key
pub const API_KEY_ENV: &str = "API_KEY";

/// Environment variable overriding the stdio server's base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Returned by every tool when the HTTP server receives no `api_key`
pub const MISSING_API_KEY_MESSAGE: &str =
    "Error: No API Key provided. Please add ?api_key=YOUR_KEY to your MCP server URL.";

/// An API key, wiped from memory on drop and redacted from debug output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Wrap a key; empty strings are treated as no key
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(key)))
        }
    }

    /// Read the key from `API_KEY`
    pub fn from_env() -> Result<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .and_then(Self::new)
            .ok_or(RuntimeError::MissingApiKey)
    }

    /// Access the raw key
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Connection settings for an [`ApiSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl SessionConfig {
    /// Long-lived stdio process: 60 second ceiling
    pub fn stdio(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: "FinancialReports-MCP-Server/1.0".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Stdio preset with the base URL taken from `API_BASE_URL` when set
    pub fn stdio_from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::stdio(base_url)
    }

    /// Network-served variant: one client per invocation, 30 second ceiling
    pub fn worker() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: "FinancialReports-MCP-Server/1.1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// HTTP client bound to the API base URL and one caller's key
pub struct ApiSession {
    client: Client,
    base_url: String,
}

impl ApiSession {
    /// Build a session; certificate verification is disabled for the upstream.
    ///
    /// Redirects are not followed: a 3xx is reported like any other non-2xx
    /// status and the key header never reaches the redirect target.
    pub fn new(config: &SessionConfig, api_key: &ApiKey) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(api_key.expose())
            .map_err(|_| RuntimeError::InvalidApiKey)?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET for `{base_url}{path}`
    pub async fn get(&self, path: &str, query: &QueryParams) -> reqwest::Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} ({} query params)", url, query.len());

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query.pairs());
        }
        request.send().await
    }

    /// Standard passthrough call: formatted JSON or an error string
    pub async fn call_json(&self, path: &str, query: &QueryParams) -> String {
        match self.get(path, query).await {
            Ok(response) => format_response(response).await,
            Err(e) => {
                warn!("Request to {} failed: {}", path, e);
                format!("{}{}", ERROR_CALLING_API, e)
            }
        }
    }

    /// Fetch a whole markdown document and return one character window
    pub async fn call_markdown(&self, path: &str, offset: i64, limit: i64) -> String {
        let response = match self.get(path, &QueryParams::new()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Markdown request to {} failed: {}", path, e);
                return format!("{}{}", ERROR_RETRIEVING_MARKDOWN, e);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return format!("{}{}", ERROR_RETRIEVING_MARKDOWN, e),
        };

        if !status.is_success() {
            return format!(
                "Error: {} {}\n{}",
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                body
            );
        }

        MarkdownPage::slice(&body, offset, limit).render()
    }
}

/// Where tool invocations get their [`ApiSession`]
#[derive(Clone)]
pub enum SessionSource {
    /// One client for the process lifetime
    Shared(Arc<ApiSession>),
    /// A fresh client per invocation, keyed by the request's API key
    PerRequest(SessionConfig),
}

impl SessionSource {
    /// Session for one invocation.
    ///
    /// `Err` carries the text to return to the caller instead of running the
    /// tool (missing key, client construction failure).
    pub fn acquire(&self, api_key: Option<&ApiKey>) -> std::result::Result<Arc<ApiSession>, String> {
        match self {
            Self::Shared(session) => Ok(session.clone()),
            Self::PerRequest(config) => {
                let key = api_key.ok_or_else(|| MISSING_API_KEY_MESSAGE.to_string())?;
                ApiSession::new(config, key)
                    .map(Arc::new)
                    .map_err(|e| format!("{}{}", ERROR_CALLING_API, e))
            }
        }
    }
}
