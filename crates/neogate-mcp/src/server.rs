//! MCP server implementation: JSON-RPC 2.0 over stdio.
//!
//! One request per line on stdin, one response per line on stdout. Logs go
//! to stderr; stdout is reserved for the protocol. Requests are handled
//! sequentially in arrival order; the guard and normalizer are pure, so the
//! only suspension point per request is the database call itself, which is
//! fully awaited before the response is written.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use neogate_graph::ConnectionHandle;

use crate::error::McpResult;
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools::{execute_tool, get_tools, ToolContext};
use crate::{SERVER_NAME, VERSION};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server identity reported in the protocol handshake.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: VERSION.to_string(),
        }
    }
}

/// The Neogate MCP server.
///
/// Holds the shared connection handle for its entire lifetime. The handle is
/// injected rather than created internally so tests can point it at an
/// unreachable address and exercise every failure path offline.
pub struct McpServer {
    config: ServerConfig,
    context: ToolContext,
    initialized: bool,
}

impl McpServer {
    pub fn new(config: ServerConfig, handle: Arc<ConnectionHandle>) -> Self {
        Self {
            config,
            context: ToolContext::new(handle),
            initialized: false,
        }
    }

    /// Run the server over stdio until stdin closes.
    pub async fn run_stdio(&mut self) -> McpResult<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);

        info!(
            uri = %self.context.handle.uri(),
            "Neogate MCP server starting on stdio"
        );

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).await?;
            if read == 0 {
                break; // EOF
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {line}");

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(JsonRpcResponse::error(
                    None,
                    -32700,
                    format!("Parse error: {e}"),
                )),
            };

            if let Some(response) = response {
                let text = serde_json::to_string(&response)?;
                debug!("Sending: {text}");
                stdout.write_all(text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one JSON-RPC request. Returns `None` for notifications, which
    /// must not receive a response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(id)),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                None
            }
            "shutdown" => {
                self.initialized = false;
                info!("Server shutting down");
                Some(JsonRpcResponse::success(id, json!(null)))
            }
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Some(self.handle_tools_list(id)),
            "tools/call" => {
                if !self.initialized {
                    debug!("tools/call before initialized notification");
                }
                Some(self.handle_tools_call(id, request.params).await)
            }
            method => {
                if id.is_none() {
                    debug!("Ignoring unknown notification: {method}");
                    return None;
                }
                warn!("Unknown method: {method}");
                Some(JsonRpcResponse::error(
                    id,
                    -32601,
                    format!("Method not found: {method}"),
                ))
            }
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>) -> JsonRpcResponse {
        info!("Server initialized");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, -32700, e.to_string()),
        }
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ListToolsResult { tools: get_tools() };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, -32700, e.to_string()),
        }
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params".to_string()),
        };

        match execute_tool(&params.name, params.arguments, &self.context).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, -32700, e.to_string()),
            },
            Err(e) => JsonRpcResponse::error(id, e.code(), e.to_string()),
        }
    }
}
