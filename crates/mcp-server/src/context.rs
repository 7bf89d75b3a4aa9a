//! Per-invocation request context

use crate::session::ApiKey;

/// Values carried from the inbound request into a tool invocation.
///
/// The HTTP transport fills `api_key` from the `api_key` query parameter of
/// the request that delivered the call; the stdio transport leaves it empty
/// and tools use the process-wide session.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub api_key: Option<ApiKey>,
}

impl RequestContext {
    /// Context carrying a caller-supplied key
    pub fn with_api_key(api_key: Option<ApiKey>) -> Self {
        Self { api_key }
    }
}
