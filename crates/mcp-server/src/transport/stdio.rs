//! stdio transport for MCP (used by desktop agent hosts)

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::context::RequestContext;
use crate::error::Result;
use crate::protocol::{McpError, McpMessage, RequestHandler};

/// stdio transport for MCP protocol.
///
/// Each line is one JSON-RPC message. Messages are handled concurrently and
/// responses are written by a single writer task, one line each, in
/// completion order.
pub struct StdioTransport {
    handler: Arc<RequestHandler>,
}

impl StdioTransport {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        info!("Starting MCP server on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve any line-oriented reader/writer pair
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<McpMessage>();

        let writer_task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let line = serde_json::to_string(&message)?;
                debug!("Sending: {}", line);
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, crate::error::RuntimeError>(())
        });

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            debug!("Received: {}", text);

            let message: McpMessage = match serde_json::from_str(text) {
                Ok(message) => message,
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    let _ = tx.send(McpMessage::error_response(None, McpError::parse_error()));
                    continue;
                }
            };

            let handler = self.handler.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handler.handle(message, &RequestContext::default()).await {
                    let _ = tx.send(response);
                }
            });
        }

        // The writer drains until every in-flight request has dropped its sender
        drop(tx);

        match writer_task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Writer task failed: {}", e);
                Ok(())
            }
        }
    }
}
