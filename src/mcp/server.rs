//! MCP Server
//!
//! Main server loop handling JSON-RPC messages over stdio, one message per
//! line. Requests are served concurrently; responses are written as they
//! complete and matched by `id` on the client side.

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::handlers::ToolHandlers;
use super::protocol::*;
use super::tools::get_tools;
use crate::odoo::Dispatcher;

const PREVIEW_CHARS: usize = 100;

/// MCP Server
#[derive(Clone)]
pub struct McpServer {
    handlers: ToolHandlers,
}

impl McpServer {
    /// Create a new MCP server over a dispatcher
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            handlers: ToolHandlers::new(dispatcher),
        }
    }

    pub fn handlers(&self) -> &ToolHandlers {
        &self.handlers
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches end of input and every in-flight call has answered
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            while let Some(out) = rx.recv().await {
                debug!("-> {}", preview(&out));
                writer.write_all(out.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        info!("Server started, waiting for messages...");

        let mut in_flight = JoinSet::new();
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            debug!("<- {}", preview(&line));

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle(&line).await {
                    match serde_json::to_string(&response) {
                        Ok(out) => {
                            let _ = tx.send(out);
                        }
                        Err(e) => warn!("Failed to serialize response: {}", e),
                    }
                }
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!("Request task failed: {}", e);
            }
        }
        drop(tx);
        writer_task.await??;

        info!("Server shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message; notifications get no response
    pub async fn handle(&self, msg: &str) -> Option<JsonRpcResponse> {
        let req: JsonRpcRequest = match serde_json::from_str(msg) {
            Ok(r) => r,
            Err(e) => return Some(JsonRpcResponse::error(None, PARSE_ERROR, e.to_string())),
        };

        if !req.jsonrpc.is_empty() && req.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                req.id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", req.jsonrpc),
            ));
        }

        if req.is_notification() {
            debug!("Notification: {}", req.method);
            return None;
        }

        let id = req.id.clone();

        let response = match req.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.into(),
                    capabilities: ServerCapabilities {
                        tools: ToolsCapability {
                            list_changed: false,
                        },
                    },
                    server_info: ServerInfo {
                        name: "odoo-mcp".into(),
                        version: env!("CARGO_PKG_VERSION").into(),
                    },
                };
                to_response(id, result)
            }

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => to_response(id, ToolsListResult { tools: get_tools() }),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => return Some(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())),
                };

                info!(tool = %params.name, "Calling tool");
                let result = self.handlers.handle(&params.name, params.arguments).await;
                to_response(id, result)
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        };
        Some(response)
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}

fn preview(line: &str) -> String {
    if line.chars().count() > PREVIEW_CHARS {
        let head: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}
