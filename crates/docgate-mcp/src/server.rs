//! MCP server: JSON-RPC dispatch plus stdio and HTTP transports

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    envelope::{coerce_arguments, ToolErrorKind, ToolRequest, ToolResult},
    jsonrpc::{
        error_response, success_response, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
        INVALID_REQUEST, JSONRPC_VERSION, PARSE_ERROR,
    },
    mcp::{
        negotiate_version, Implementation, InitializeRequest, InitializeResponse,
        ServerCapabilities, Tool, ToolsCallRequest, ToolsCallResponse, ToolsCapability,
        ToolsListRequest, ToolsListResponse, LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE,
        METHOD_PING, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SUPPORTED_PROTOCOL_VERSIONS,
    },
    tools::{catalog, find_tool},
    AppState, GovernanceConfig, McpError, McpResult,
};

const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";
const SESSION_ID_HEADER: &str = "mcp-session-id";

/// MCP Server
pub struct McpServer {
    pub app_state: AppState,
    governance: GovernanceConfig,
}

impl McpServer {
    pub fn new(app_state: AppState, governance: GovernanceConfig) -> Self {
        Self { app_state, governance }
    }

    pub fn governance(&self) -> &GovernanceConfig {
        &self.governance
    }

    /// Process one raw JSON-RPC message. Returns `None` for notifications.
    ///
    /// Every failure, including unparseable input, is turned into a JSON-RPC error response.
    pub async fn process_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse JSON-RPC message: {}", e);
                return Some(error_response(None, JsonRpcError::parse_error().with_message(e.to_string())));
            }
        };

        if value.is_array() {
            warn!("Batch requests are not supported");
            return Some(error_response(
                None,
                JsonRpcError::invalid_request().with_message("Batch requests are not supported"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(None, JsonRpcError::invalid_request().with_message(e.to_string())))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(error_response(
                request.id,
                JsonRpcError::invalid_request().with_message("Invalid JSON-RPC version"),
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification, ignoring");
            return None;
        }

        debug!(method = %request.method, "Processing request");

        let result = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(&request),
            METHOD_TOOLS_CALL => self.handle_tools_call(&request).await,
            _ => {
                return Some(error_response(
                    request.id,
                    JsonRpcError::method_not_found().with_data(json!({"method": request.method})),
                ))
            }
        };

        Some(match result {
            Ok(result) => success_response(request.id, result),
            Err(e) => {
                warn!(method = %request.method, error = %e, "Request failed");
                error_response(request.id, e.to_jsonrpc_error())
            }
        })
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request.params.as_ref().ok_or_else(|| {
            McpError::InvalidArguments("Missing params for initialize".to_string())
        })?;
        let init_request: InitializeRequest = serde_json::from_value(params.clone())?;
        let protocol_version = negotiate_version(&init_request.protocol_version);

        if let Some(client) = &init_request.client_info {
            info!(client = %client.name, version = %client.version, protocol_version, "Client initialized");
        }

        let response = InitializeResponse {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: Implementation {
                name: "docgate".to_string(),
                title: Some("Docgate document store tools".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Browse, query, read, delete and upsert items in a partitioned document store."
                    .to_string(),
            ),
        };
        Ok(serde_json::to_value(response)?)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let _params: ToolsListRequest = match &request.params {
            Some(params) => serde_json::from_value(params.clone())?,
            None => ToolsListRequest::default(),
        };

        let tools: Vec<Tool> = catalog()
            .iter()
            .filter(|spec| {
                let allowed = self.governance.is_tool_allowed(spec.name);
                if !allowed {
                    debug!("Tool '{}' filtered by governance policy", spec.name);
                }
                allowed
            })
            .map(Tool::from)
            .collect();

        Ok(serde_json::to_value(ToolsListResponse { tools })?)
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request.params.as_ref().ok_or_else(|| {
            McpError::InvalidArguments("Missing params for tools/call".to_string())
        })?;
        let call_request: ToolsCallRequest = serde_json::from_value(params.clone())?;

        let tool_request = ToolRequest::new(
            call_request.name,
            coerce_arguments(call_request.arguments.unwrap_or_default()),
        );
        let result = self.invoke(&tool_request).await?;
        Ok(serde_json::to_value(ToolsCallResponse::from(&result))?)
    }

    /// Run one tool invocation under governance.
    ///
    /// Denied tools are an error; everything the gateway reports is an envelope.
    pub async fn invoke(&self, request: &ToolRequest) -> McpResult<ToolResult> {
        // aliases are governed by their canonical name; the gateway reports unknown names
        let governed_name = find_tool(&request.tool_name).map(|spec| spec.name);
        if governed_name.is_some_and(|name| !self.governance.is_tool_allowed(name)) {
            warn!("Tool '{}' denied by governance policy", request.tool_name);
            return Err(McpError::PermissionDenied(format!(
                "Tool '{}' is not allowed",
                request.tool_name
            )));
        }

        let _permit = self
            .governance
            .concurrency_limiter
            .acquire()
            .await
            .map_err(|_| McpError::Internal("Failed to acquire concurrency permit".to_string()))?;

        debug!("Calling tool: {}", request.tool_name);
        Ok(self.app_state.gateway.handle(request).await)
    }
}

fn log_governance(governance: &GovernanceConfig) {
    info!("Governance: max_concurrency={}", governance.max_concurrency);
    if !governance.allow_patterns.is_empty() {
        info!("Allow patterns: {:?}", governance.allow_patterns);
    }
    if !governance.deny_patterns.is_empty() {
        info!("Deny patterns: {:?}", governance.deny_patterns);
    }
}

/// Serve MCP over stdio, one JSON-RPC message per line
pub async fn serve_stdio(app_state: AppState, governance: GovernanceConfig) -> McpResult<()> {
    info!("Starting Docgate MCP server (stdio mode)");
    log_governance(&governance);

    let server = McpServer::new(app_state, governance);
    serve_lines(&server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    info!("MCP server stopped");
    Ok(())
}

/// Line-delimited message loop over any reader/writer pair
pub async fn serve_lines<R, W>(server: &McpServer, reader: R, mut writer: W) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!("Processing line: {}", line);

        if let Some(response) = server.process_message(line.as_bytes()).await {
            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }
    Ok(())
}

fn mcp_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(PROTOCOL_VERSION_HEADER, HeaderValue::from_static(LATEST_PROTOCOL_VERSION));
    if let Ok(session) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        headers.insert(SESSION_ID_HEADER, session);
    }
    headers
}

async fn handle_mcp_request(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    if let Some(protocol_version) = headers.get(PROTOCOL_VERSION_HEADER) {
        let version_str = protocol_version.to_str().unwrap_or("");
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&version_str) {
            warn!("Unsupported MCP protocol version: {}", version_str);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Unsupported MCP protocol version",
                    "supported_versions": SUPPORTED_PROTOCOL_VERSIONS
                })),
            )
                .into_response();
        }
    }

    match server.process_message(&body[..]).await {
        Some(response) => {
            let status = match response.error.as_ref().map(|e| e.code) {
                Some(PARSE_ERROR) | Some(INVALID_REQUEST) => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, mcp_headers(), Json(response)).into_response()
        }
        // notification
        None => (StatusCode::ACCEPTED, mcp_headers()).into_response(),
    }
}

/// Raw envelope endpoint: `{"toolName", "arguments"}` in, `ToolResult` out
async fn handle_invoke(State(server): State<Arc<McpServer>>, body: axum::body::Bytes) -> Response {
    let request: ToolRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting malformed invoke body: {}", e);
            let result =
                ToolResult::failure(ToolErrorKind::Validation, format!("Invalid request: {}", e));
            return (StatusCode::BAD_REQUEST, Json(result)).into_response();
        }
    };

    match server.invoke(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("Error processing invoke request: {}", e);
            (e.status_code(), Json(json!({"success": false, "error": e.to_string()}))).into_response()
        }
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

/// HTTP routes: `POST /mcp`, `POST /invoke`, `GET /health`
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_request))
        .route("/invoke", post(handle_invoke))
        .route("/health", get(handle_health))
        .with_state(server)
}

/// Serve MCP over HTTP
pub async fn serve_http(app_state: AppState, governance: GovernanceConfig, addr: &str) -> McpResult<()> {
    info!("Starting Docgate MCP server (HTTP mode) on {}", addr);
    log_governance(&governance);

    let app = router(Arc::new(McpServer::new(app_state, governance)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("HTTP MCP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| McpError::Internal(format!("HTTP server error: {}", e)))?;

    Ok(())
}
