/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Routes tool calls to the journal tools
/// 3. Sends JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, JournalError};
use crate::{JournalServer, ServerError};

/// MCP server that handles communication with a client
pub struct McpServer {
    journal: JournalServer,
    /// Whether the client has completed the initialize handshake
    initialized: bool,
}

impl McpServer {
    pub fn new(journal: JournalServer) -> Self {
        Self {
            journal,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request; notifications produce no response
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            match request.method.as_str() {
                "notifications/initialized" | "initialized" => self.initialized = true,
                other => debug!("Ignoring notification '{}'", other),
            }
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    /// Handle MCP initialization request
    async fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => {
                let client = init
                    .client_info
                    .map(|c| format!("{} {}", c.name, c.version))
                    .unwrap_or_else(|| "unknown client".to_string());
                info!("MCP client connected: {} (protocol {})", client, init.protocol_version);
            }
            Some(Err(e)) => warn!("Unreadable initialize parameters: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Journal Streaks MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    /// Handle tools/list request
    async fn handle_tools_list(&mut self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            tool_definition::<tools::RegisterUserParams>(
                "user_register",
                "Register a new journal writer",
            ),
            tool_definition::<tools::CreateEntryParams>(
                "journal_create",
                "Write the journal entry for a day (defaults to today); updates word counts and streaks",
            ),
            tool_definition::<tools::UpdateEntryParams>(
                "journal_update",
                "Replace the content of an existing entry; blank content deletes the entry",
            ),
            tool_definition::<tools::DeleteEntryParams>(
                "journal_delete",
                "Delete the journal entry for a day and recompute streaks",
            ),
            tool_definition::<tools::GetEntryParams>(
                "journal_get",
                "Read the journal entry for a day; private entries are only shown to their owner",
            ),
            tool_definition::<tools::HeatmapParams>(
                "journal_heatmap",
                "Daily word counts for all history or a single year",
            ),
            tool_definition::<tools::UserParams>(
                "streak_status",
                "Calculate current and highest writing streaks without changing stored values",
            ),
            tool_definition::<tools::UserParams>(
                "user_profile",
                "Show a writer's totals and streaks",
            ),
        ];

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        if !self.initialized {
            debug!("Tool call before initialized notification");
        }

        let name = tool_params.name.as_str();
        let args = Value::Object(tool_params.arguments.into_iter().collect());
        let storage = self.journal.storage();
        let engine = self.journal.engine();

        let result = match name {
            "user_register" => call_tool(name, args, |p| tools::register_user(storage, p)),
            "journal_create" => call_tool(name, args, |p| tools::create_entry(storage, engine, p)),
            "journal_update" => call_tool(name, args, |p| tools::update_entry(storage, engine, p)),
            "journal_delete" => call_tool(name, args, |p| tools::delete_entry(storage, engine, p)),
            "journal_get" => call_tool(name, args, |p| tools::get_entry(storage, p)),
            "journal_heatmap" => call_tool(name, args, |p| tools::get_heatmap(storage, p)),
            "streak_status" => call_tool(name, args, |p| tools::get_streak_status(storage, engine, p)),
            "user_profile" => call_tool(name, args, |p| tools::get_profile(storage, engine, p)),
            _ => ToolCallResult::error(format!("Unknown tool: {}", name)),
        };

        to_response(id, &result)
    }
}

fn tool_definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(T);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
    }
}

/// Decode arguments, run the tool and render its response as text
///
/// The text starts with the response's `message` (when it has one) followed
/// by the full JSON payload.
fn call_tool<P, R, F>(name: &str, args: Value, f: F) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> Result<R, JournalError>,
{
    let params: P = match serde_json::from_value(args) {
        Ok(p) => p,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments for {}: {}", name, e)),
    };

    match f(params) {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(value) => {
                let payload = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                match value.get("message").and_then(Value::as_str) {
                    Some(message) => ToolCallResult::success(format!("{}\n\n{}", message, payload)),
                    None => ToolCallResult::success(payload),
                }
            }
            Err(e) => ToolCallResult::error(format!("Failed to encode response: {}", e)),
        },
        Err(e) => {
            let code = e.error_code();
            warn!(code, "Tool {} failed: {}", name, e);
            ToolCallResult::failure(code, e.to_string())
        }
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to encode result: {}", e),
            None,
        ),
    }
}
