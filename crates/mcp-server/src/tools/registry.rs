//! Tool handlers and the registry the protocol handler dispatches to

use async_trait::async_trait;
use indexmap::IndexMap;
use openapi_parser::ToolDefinition;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use super::binding::BindError;
use super::executor::OperationTool;
use crate::context::RequestContext;
use crate::protocol::McpTool;
use crate::session::{ApiSession, SessionSource};

/// A callable tool.
///
/// `call` returns the caller-visible text on every path once arguments are
/// bound; only argument problems come back as `Err`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Listing entry for `tools/list`
    fn tool(&self) -> &McpTool;

    async fn call(
        &self,
        sessions: &SessionSource,
        ctx: &RequestContext,
        arguments: Option<Value>,
    ) -> Result<String, BindError>;
}

/// Tool backed by a typed argument struct and an async function.
///
/// This is what generated servers register: `A` is the emitted `*Args`
/// struct and `F` the emitted tool function.
pub struct FnTool<A, F> {
    tool: McpTool,
    func: F,
    _args: PhantomData<fn() -> A>,
}

impl<A, F> FnTool<A, F> {
    pub fn new<Fut>(tool: McpTool, func: F) -> Self
    where
        F: Fn(Arc<ApiSession>, A) -> Fut,
    {
        Self {
            tool,
            func,
            _args: PhantomData,
        }
    }
}

#[async_trait]
impl<A, F, Fut> ToolHandler for FnTool<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(Arc<ApiSession>, A) -> Fut + Send + Sync,
    Fut: Future<Output = String> + Send + 'static,
{
    fn tool(&self) -> &McpTool {
        &self.tool
    }

    async fn call(
        &self,
        sessions: &SessionSource,
        ctx: &RequestContext,
        arguments: Option<Value>,
    ) -> Result<String, BindError> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(value @ Value::Object(_)) => value,
            Some(_) => return Err(BindError::NotAnObject),
        };
        let args: A = serde_json::from_value(arguments)
            .map_err(|e| BindError::InvalidArguments(e.to_string()))?;

        let session = match sessions.acquire(ctx.api_key.as_ref()) {
            Ok(session) => session,
            Err(text) => return Ok(text),
        };
        Ok((self.func)(session, args).await)
    }
}

/// Ordered set of tools keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry interpreting tool definitions at runtime
    pub fn from_definitions(definitions: impl IntoIterator<Item = ToolDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(OperationTool::new(definition));
        }
        registry
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn register<H: ToolHandler + 'static>(&mut self, handler: H) {
        let name = handler.tool().name.clone();
        if self.tools.insert(name.clone(), Arc::new(handler)).is_some() {
            warn!("Tool {} registered twice, keeping the last definition", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    /// Listings in registration order
    pub fn list(&self) -> Vec<McpTool> {
        self.tools.values().map(|t| t.tool().clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
