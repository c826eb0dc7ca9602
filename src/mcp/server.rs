// MCP server: reads JSON-RPC requests from stdin line by line, answers on
// stdout. Each request is handled to completion before the next line is read,
// so tool calls never overlap.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::transport::{ErrorCode, JsonRpcRequest, JsonRpcResponse};
use crate::core::docs::DocsBackend;
use crate::core::tools::ToolDispatcher;

pub const SERVER_NAME: &str = "googledocs";
const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer<B: DocsBackend> {
    dispatcher: ToolDispatcher<B>,
}

impl<B: DocsBackend> McpServer<B> {
    pub fn new(dispatcher: ToolDispatcher<B>) -> Self {
        Self { dispatcher }
    }

    /// Serves stdin/stdout until stdin is closed.
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            // Bad bytes only cost the sender this one line.
            let response = match serde_json::from_slice::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(JsonRpcResponse::error(
                    Value::Null,
                    ErrorCode::ParseError,
                    format!("failed to parse JSON-RPC request: {}", e),
                )),
            };

            if let Some(response) = response {
                let mut output = serde_json::to_vec(&response)?;
                output.push(b'\n');
                writer.write_all(&output).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Returns `None` for notifications.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                ErrorCode::InvalidRequest,
                format!("unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": self.dispatcher.definitions() }))
            }
            "tools/call" => self.handle_tools_call(id, request.params).await,
            other => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("method not found: {}", other),
            ),
        };

        Some(response)
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let Some(mut params) = params else {
            return JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                "missing params for tools/call".to_string(),
            );
        };

        let Some(name) = params.get("name").and_then(|v| v.as_str()).map(str::to_string) else {
            return JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                "missing 'name' in tools/call params".to_string(),
            );
        };
        let arguments = params
            .get_mut("arguments")
            .map(Value::take)
            .unwrap_or(Value::Null);

        // Tool failures are results, not protocol errors, so the client can
        // show the message to the model.
        let (text, is_error) = match self.dispatcher.call(&name, arguments).await {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::error!(tool = %name, "Tool call failed: {}", e);
                (e.to_string(), true)
            }
        };

        JsonRpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": is_error
            }),
        )
    }
}
