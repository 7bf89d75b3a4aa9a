//! HTTP/SSE transport for MCP
//!
//! Every path except `/health` goes through one fallback handler. It
//! delegates to the endpoint object registered under [`SINGLETON`], which
//! speaks MCP two ways:
//!
//! - `GET` opens an SSE stream whose first `endpoint` event names the URL to
//!   post messages to; responses to those messages arrive as `message` events.
//! - `POST` with `session_id` delivers a message for an open stream and gets
//!   `202 Accepted`. `POST` without one is plain request/response JSON.
//!
//! The caller's API key travels as the `api_key` query parameter.

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{Method, Request, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::Result;
use crate::protocol::{McpError, McpMessage, RequestHandler};
use crate::session::ApiKey;

/// Name of the per-process endpoint object
pub const SINGLETON: &str = "singleton";

/// Path announced in the SSE `endpoint` event
pub const MESSAGE_PATH: &str = "/messages/";

/// An open SSE stream
struct StreamSession {
    sender: mpsc::UnboundedSender<McpMessage>,
    api_key: Option<ApiKey>,
}

/// The MCP endpoint object: a handler plus its open streams
pub struct McpEndpoint {
    handler: Arc<RequestHandler>,
    streams: Mutex<HashMap<Uuid, StreamSession>>,
}

/// Removes a stream from its endpoint when the SSE response is dropped
struct StreamGuard {
    endpoint: Arc<McpEndpoint>,
    id: Uuid,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.endpoint.remove_stream(&self.id);
        info!(session_id = %self.id, "SSE stream closed");
    }
}

impl McpEndpoint {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self {
            handler,
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Number of open SSE streams
    pub fn stream_count(&self) -> usize {
        self.streams.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn remove_stream(&self, id: &Uuid) {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }

    fn stream_for(&self, id: &Uuid) -> Option<(mpsc::UnboundedSender<McpMessage>, Option<ApiKey>)> {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .map(|s| (s.sender.clone(), s.api_key.clone()))
    }

    /// Route one inbound request
    pub async fn fetch(
        self: Arc<Self>,
        method: Method,
        query: HashMap<String, String>,
        body: Bytes,
    ) -> Response {
        let api_key = query.get("api_key").cloned().and_then(ApiKey::new);

        if method == Method::GET {
            self.open_stream(api_key).into_response()
        } else if method == Method::POST {
            match query.get("session_id") {
                Some(session_id) => self.post_to_stream(session_id, api_key, &body).await,
                None => self.post_direct(api_key, &body).await,
            }
        } else {
            StatusCode::METHOD_NOT_ALLOWED.into_response()
        }
    }

    fn open_stream(
        self: Arc<Self>,
        api_key: Option<ApiKey>,
    ) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
        let id = Uuid::new_v4();
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let endpoint_url = message_endpoint(&id, api_key.as_ref());
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, StreamSession { sender, api_key });
        info!(session_id = %id, "SSE stream opened");

        let guard = StreamGuard { endpoint: self, id };
        let stream = async_stream::stream! {
            let _guard = guard;
            yield Ok(Event::default().event("endpoint").data(endpoint_url));

            while let Some(message) = receiver.recv().await {
                match serde_json::to_string(&message) {
                    Ok(data) => yield Ok(Event::default().event("message").data(data)),
                    Err(e) => warn!("Failed to serialize response: {}", e),
                }
            }
        };

        Sse::new(stream).keep_alive(KeepAlive::default())
    }

    async fn post_to_stream(&self, session_id: &str, api_key: Option<ApiKey>, body: &[u8]) -> Response {
        let Some((sender, stream_key)) = Uuid::parse_str(session_id)
            .ok()
            .and_then(|id| self.stream_for(&id))
        else {
            return (StatusCode::NOT_FOUND, "Session not found").into_response();
        };

        let message = match serde_json::from_slice::<McpMessage>(body) {
            Ok(message) => message,
            Err(e) => {
                debug!("Invalid message for session {}: {}", session_id, e);
                return (StatusCode::BAD_REQUEST, Json(parse_error())).into_response();
            }
        };

        let ctx = RequestContext::with_api_key(api_key.or(stream_key));
        let handler = self.handler.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle(message, &ctx).await {
                if sender.send(response).is_err() {
                    debug!("Stream closed before the response was delivered");
                }
            }
        });

        StatusCode::ACCEPTED.into_response()
    }

    async fn post_direct(&self, api_key: Option<ApiKey>, body: &[u8]) -> Response {
        let message = match serde_json::from_slice::<McpMessage>(body) {
            Ok(message) => message,
            Err(e) => {
                debug!("Invalid JSON-RPC body: {}", e);
                return (StatusCode::BAD_REQUEST, Json(parse_error())).into_response();
            }
        };

        let ctx = RequestContext::with_api_key(api_key);
        match self.handler.handle(message, &ctx).await {
            Some(response) => Json(response).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        }
    }
}

fn parse_error() -> McpMessage {
    McpMessage::error_response(None, McpError::parse_error())
}

/// Message URL for a stream, carrying the key so follow-up posts authenticate
fn message_endpoint(id: &Uuid, api_key: Option<&ApiKey>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("session_id", &id.to_string());
    if let Some(key) = api_key {
        query.append_pair("api_key", key.expose());
    }
    format!("{}?{}", MESSAGE_PATH, query.finish())
}

/// Named endpoint objects, created on first use
#[derive(Default)]
pub struct EndpointNamespace {
    objects: Mutex<HashMap<String, Arc<McpEndpoint>>>,
}

impl EndpointNamespace {
    pub fn get_or_create(&self, name: &str, create: impl FnOnce() -> McpEndpoint) -> Arc<McpEndpoint> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(create()))
            .clone()
    }
}

/// Shared state for HTTP handlers
struct AppState {
    handler: Arc<RequestHandler>,
    namespace: EndpointNamespace,
}

/// HTTP transport for MCP protocol
pub struct HttpTransport {
    handler: Arc<RequestHandler>,
    port: u16,
}

impl HttpTransport {
    pub fn new(handler: Arc<RequestHandler>, port: u16) -> Self {
        Self { handler, port }
    }

    /// Router serving `/health` and the MCP entrypoint
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            handler: self.handler.clone(),
            namespace: EndpointNamespace::default(),
        });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health))
            .fallback(entrypoint)
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(cors)
            .with_state(state)
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        info!("Starting MCP HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Request span with the path only; the query string carries `api_key`
fn request_span<B>(request: &Request<B>) -> tracing::Span {
    tracing::debug_span!("request", method = %request.method(), path = %request.uri().path())
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

async fn entrypoint(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let endpoint = state
        .namespace
        .get_or_create(SINGLETON, || McpEndpoint::new(state.handler.clone()));
    endpoint.fetch(method, query, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionConfig, SessionSource};
    use crate::tools::ToolRegistry;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn transport() -> HttpTransport {
        let handler = RequestHandler::new(
            Arc::new(ToolRegistry::new()),
            SessionSource::PerRequest(SessionConfig::worker()),
        );
        HttpTransport::new(Arc::new(handler), 0)
    }

    #[test]
    fn test_message_endpoint_encodes_key() {
        let id = Uuid::nil();
        let key = ApiKey::new("a b&c").unwrap();
        assert_eq!(
            message_endpoint(&id, Some(&key)),
            "/messages/?session_id=00000000-0000-0000-0000-000000000000&api_key=a+b%26c"
        );
        assert_eq!(
            message_endpoint(&id, None),
            "/messages/?session_id=00000000-0000-0000-0000-000000000000"
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_request_logs_omit_api_key() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let body = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
        let response = transport()
            .router()
            .oneshot(
                Request::post("/mcp?api_key=very-secret-key")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("path=/mcp"), "{}", output);
        assert!(!output.contains("very-secret-key"), "{}", output);
        assert!(!output.contains("api_key"), "{}", output);
    }

    #[test]
    fn test_namespace_returns_same_object() {
        let namespace = EndpointNamespace::default();
        let handler = transport().handler;
        let a = namespace.get_or_create(SINGLETON, || McpEndpoint::new(handler.clone()));
        let b = namespace.get_or_create(SINGLETON, || McpEndpoint::new(handler.clone()));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_health() {
        let response = transport()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_direct_post_on_any_path() {
        let body = r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#;
        let response = transport()
            .router()
            .oneshot(
                Request::post("/mcp?api_key=k")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reply: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reply["id"], 7);
        assert!(reply["result"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let response = transport()
            .router()
            .oneshot(
                Request::post(format!("/messages/?session_id={}", Uuid::new_v4()))
                    .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_body_is_parse_error() {
        let response = transport()
            .router()
            .oneshot(Request::post("/").body(Body::from("nope")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_session_round_trip() {
        let endpoint = Arc::new(McpEndpoint::new(transport().handler));
        let sse = endpoint.clone().open_stream(ApiKey::new("k"));
        assert_eq!(endpoint.stream_count(), 1);

        let id = *endpoint
            .streams
            .lock()
            .unwrap()
            .keys()
            .next()
            .unwrap();
        let response = endpoint
            .post_to_stream(
                &id.to_string(),
                None,
                br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            )
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        drop(sse);
        assert_eq!(endpoint.stream_count(), 0);
    }
}
