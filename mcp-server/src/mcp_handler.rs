use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{info, warn};

use crate::use_cases::{CheckUseCase, CollectUseCase, DrawUseCase, InvalidParams};

#[derive(Debug, serde::Deserialize)]
struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

pub struct MCPHandler {
    draw_use_case: Arc<DrawUseCase>,
    check_use_case: Arc<CheckUseCase>,
    collect_use_case: Arc<CollectUseCase>,
}

impl MCPHandler {
    pub fn new(
        draw_use_case: Arc<DrawUseCase>,
        check_use_case: Arc<CheckUseCase>,
        collect_use_case: Arc<CollectUseCase>,
    ) -> Self {
        Self {
            draw_use_case,
            check_use_case,
            collect_use_case,
        }
    }

    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {} - Line: {}", e, line);
                    let error_response = JsonRpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32700,
                            message: "Parse error".to_string(),
                            data: Some(json!(e.to_string())),
                        }),
                        id: None,
                    };
                    let response_json = serde_json::to_string(&error_response)?;
                    writeln!(writer, "{}", response_json)?;
                    writer.flush()?;
                    continue;
                }
            };

            // Notifications never get a response.
            let is_notification =
                request.id.is_none() || request.method.starts_with("notifications/");
            if is_notification {
                if request.method == "notifications/initialized" {
                    info!("🎟️ Client initialized");
                }
                continue;
            }

            if request.jsonrpc != "2.0" {
                warn!(
                    "Unexpected jsonrpc version {:?} for method {}",
                    request.jsonrpc, request.method
                );
            }

            let response = self.handle_request(request).await;
            let response_json = serde_json::to_string(&response)?;
            writeln!(writer, "{}", response_json)?;
            writer.flush()?;
        }

        Ok(())
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id).await,
            "tools/list" => self.handle_list_tools(request.id).await,
            "tools/call" => self.handle_call_tool(request.params, request.id).await,
            _ => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                }),
                id: Some(request.id.unwrap_or(json!(1))),
            },
        }
    }

    async fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("🎟️ Initializing lottery checker MCP server");
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "lottery-mcp-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.get_tools();
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(json!({ "tools": tools })),
            error: None,
            id: Some(id.unwrap_or(json!(1))),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>, id: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing params".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let tool_name = match params.get("name").and_then(|n| n.as_str()) {
            Some(name) => name,
            None => {
                return JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32602,
                        message: "Missing tool name".to_string(),
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                };
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
        let arguments_map: HashMap<String, Value> = serde_json::from_value(arguments).unwrap_or_default();

        let result = self.execute_tool(tool_name, &arguments_map).await;

        match result {
            Ok(content) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(json!({
                    "content": [
                        {
                            "type": "text",
                            "text": content
                        }
                    ]
                })),
                error: None,
                id: Some(id.unwrap_or(json!(1))),
            },
            Err(e) => {
                let (code, message) = match e.downcast_ref::<InvalidParams>() {
                    Some(invalid) => (-32602, format!("Invalid params: {}", invalid)),
                    None => {
                        warn!("Tool {} failed: {:#}", tool_name, e);
                        (-32603, format!("Tool execution error: {}", e))
                    }
                };
                JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(JsonRpcError {
                        code,
                        message,
                        data: None,
                    }),
                    id: Some(id.unwrap_or(json!(1))),
                }
            }
        }
    }

    async fn execute_tool(&self, tool_name: &str, arguments: &HashMap<String, Value>) -> Result<String> {
        match tool_name {
            "save_draw" => self.draw_use_case.save_draw(arguments).await,
            "get_latest_draw" => self.draw_use_case.get_latest_draw(arguments).await,
            "get_draw_by_id" => self.draw_use_case.get_draw_by_id(arguments).await,
            "list_draws" => self.draw_use_case.list_draws(arguments).await,
            "check_tickets" => self.check_use_case.check_tickets(arguments).await,
            "collect_latest" => self.collect_use_case.collect_latest(arguments).await,
            _ => Err(InvalidParams::new(format!("Unknown tool: {}", tool_name)).into()),
        }
    }

    fn get_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "save_draw".to_string(),
                description: "Create or fully replace a lottery draw under its draw id".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "draw_id": {
                            "type": "string",
                            "description": "Business key of the draw, e.g. 16102568"
                        },
                        "draw": {
                            "type": "object",
                            "description": "Draw with date, endpoint, prizes and runningNumbers"
                        }
                    },
                    "required": ["draw_id", "draw"]
                }),
            },
            Tool {
                name: "get_latest_draw".to_string(),
                description: "Get the most recently stored lottery draw".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            Tool {
                name: "get_draw_by_id".to_string(),
                description: "Get a stored lottery draw by its draw id".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "draw_id": {
                            "type": "string",
                            "description": "Business key of the draw"
                        }
                    },
                    "required": ["draw_id"]
                }),
            },
            Tool {
                name: "list_draws".to_string(),
                description: "List all stored lottery draws, most recent first".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            Tool {
                name: "check_tickets".to_string(),
                description: "Check lottery ticket numbers against the latest (or a given) draw".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "numbers": {
                            "type": "array",
                            "description": "Ticket numbers to check",
                            "items": {"type": "string"},
                            "minItems": 1
                        },
                        "draw_id": {
                            "type": "string",
                            "description": "Optional draw id, defaults to the latest stored draw"
                        }
                    },
                    "required": ["numbers"]
                }),
            },
            Tool {
                name: "collect_latest".to_string(),
                description: "Fetch the newest draw from the draw source and save it if complete".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
        ]
    }
}

pub fn stdio() -> (BufReader<io::Stdin>, io::Stdout) {
    (BufReader::new(io::stdin()), io::stdout())
}
