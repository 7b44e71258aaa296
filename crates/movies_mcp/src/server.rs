//! MCP Server Implementation
//!
//! JSON-RPC 2.0 server over stdio for the Model Context Protocol.
//!
//! # Architecture
//!
//! One task reads stdin line by line; every dispatched request runs on its
//! own task sharing the store pool and the context cache; responses funnel
//! through an mpsc channel into a single writer task so no two response
//! lines ever interleave. The JSON-RPC ID is the only ordering contract -
//! response order may differ from request order under pipelining.
//!
//! The only session state besides the registries is the "initialize has
//! been observed" flag; it dies with the process.

use crate::prompts::PromptRegistry;
use crate::protocol::{
    methods, CompleteParams, ErrorCode, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, PromptGetParams, PromptsListResult,
    ResourceReadParams, ResourceTemplatesListResult, ResourcesListResult, ServerCapabilities,
    ServerInfo, SetLevelParams, ToolCallParams, ToolCallResult, ToolsListResult, JSONRPC_VERSION,
    MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::resources::ResourceRegistry;
use crate::tools::{AppContext, ToolRegistry};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Applies a new log level; wired to the subscriber's reload handle by the
/// binary.
pub type LevelReloadFn = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// MCP server configuration.
pub struct McpServerConfig {
    /// Server name (reported in initialize)
    pub server_name: String,

    /// Server version (reported in initialize)
    pub server_version: String,

    /// Optional per-request deadline. None means no deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            request_timeout: None,
        }
    }
}

impl McpServerConfig {
    /// Read the optional request deadline from the environment.
    pub fn from_env() -> Self {
        let request_timeout = std::env::var("MOVIES_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self {
            request_timeout,
            ..Default::default()
        }
    }
}

struct ServerState {
    config: McpServerConfig,
    app: AppContext,
    registry: ToolRegistry,
    resources: ResourceRegistry,
    prompts: PromptRegistry,
    initialized: AtomicBool,
    log_reload: Option<LevelReloadFn>,
}

/// MCP server: owns the stdio session.
#[derive(Clone)]
pub struct McpServer {
    state: Arc<ServerState>,
}

impl McpServer {
    pub fn new(
        config: McpServerConfig,
        app: AppContext,
        resources: ResourceRegistry,
        prompts: PromptRegistry,
    ) -> Self {
        Self {
            state: Arc::new(ServerState {
                config,
                app,
                registry: ToolRegistry::new(),
                resources,
                prompts,
                initialized: AtomicBool::new(false),
                log_reload: None,
            }),
        }
    }

    /// Attach the log-level reload hook. Must be called before `run`.
    pub fn with_log_reload(self, reload: LevelReloadFn) -> Self {
        let mut state = Arc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("with_log_reload after the server was shared"));
        state.log_reload = Some(reload);
        Self {
            state: Arc::new(state),
        }
    }

    /// Run the server: read stdin until EOF, write responses to stdout.
    pub async fn run(&self) -> std::io::Result<()> {
        info!("MCP server starting");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let (tx, mut rx) = mpsc::channel::<String>(64);

        // Single writer: response lines never interleave.
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                debug!("Sending: {}", line);
                if stdout.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if stdout.write_all(b"\n").await.is_err() {
                    break;
                }
                if stdout.flush().await.is_err() {
                    break;
                }
            }
        });

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received: {}", line);

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::new(ErrorCode::ParseError, format!("Invalid JSON: {e}")),
                    );
                    send_response(&tx, &response).await;
                    continue;
                }
            };

            // Each request gets its own task; pipelined requests proceed
            // concurrently and pair with their callers by ID.
            let state = Arc::clone(&self.state);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = dispatch(state, request).await {
                    send_response(&tx, &response).await;
                }
            });
        }

        // EOF: let in-flight tasks drain through the writer.
        drop(tx);
        let _ = writer.await;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Feed one raw input line through the full pipeline.
    ///
    /// This is the engine `run` drives; it is public so tests can exercise
    /// the session without a stdio harness.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => dispatch(Arc::clone(&self.state), request).await,
            Err(e) => Some(JsonRpcResponse::error(
                None,
                JsonRpcError::new(ErrorCode::ParseError, format!("Invalid JSON: {e}")),
            )),
        }
    }
}

async fn send_response(tx: &mpsc::Sender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = tx.send(json).await;
        }
        Err(e) => error!("Failed to serialize response: {e}"),
    }
}

/// Route one message. Returns None when no response must be written.
async fn dispatch(state: Arc<ServerState>, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    // Notifications never produce a response; unknown ones are discarded.
    if request.is_notification() {
        match request.method.as_str() {
            methods::INITIALIZED => {
                debug!("Client reports initialized");
            }
            other => {
                debug!("Discarding notification: {}", other);
            }
        }
        return None;
    }

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::error(
            request.id,
            JsonRpcError::new(
                ErrorCode::InvalidRequest,
                format!("Invalid JSON-RPC version: {}", request.jsonrpc),
            ),
        ));
    }

    // Everything but initialize is rejected until initialize is observed.
    if request.method != methods::INITIALIZE && !state.initialized.load(Ordering::SeqCst) {
        return Some(JsonRpcResponse::error(
            request.id,
            JsonRpcError::new(
                ErrorCode::InvalidRequest,
                "initialize must be the first request",
            ),
        ));
    }

    let id = request.id.clone();
    let handled = handle_request(state.clone(), request);
    let response = match state.config.request_timeout {
        Some(deadline) => match tokio::time::timeout(deadline, handled).await {
            Ok(response) => response,
            Err(_) => {
                warn!("Request deadline exceeded");
                JsonRpcResponse::error(id, JsonRpcError::new(ErrorCode::InternalError, "timeout"))
            }
        },
        None => handled.await,
    };
    Some(response)
}

async fn handle_request(state: Arc<ServerState>, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();
    match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&state, request),
        methods::TOOLS_LIST => JsonRpcResponse::success(
            id,
            to_value(ToolsListResult {
                tools: state.registry.list_tools(),
            }),
        ),
        methods::TOOLS_CALL => handle_tools_call(&state, request).await,
        methods::RESOURCES_LIST => JsonRpcResponse::success(
            id,
            to_value(ResourcesListResult {
                resources: state.resources.list(),
            }),
        ),
        methods::RESOURCES_READ => handle_resources_read(&state, request).await,
        methods::RESOURCES_TEMPLATES_LIST => JsonRpcResponse::success(
            id,
            to_value(ResourceTemplatesListResult {
                resource_templates: Vec::new(),
            }),
        ),
        methods::PROMPTS_LIST => JsonRpcResponse::success(
            id,
            to_value(PromptsListResult {
                prompts: state.prompts.list(),
            }),
        ),
        methods::PROMPTS_GET => handle_prompts_get(&state, request),
        methods::COMPLETION_COMPLETE => handle_completion(&state, request).await,
        methods::LOGGING_SET_LEVEL => handle_set_level(&state, request),
        unknown => JsonRpcResponse::error(
            id,
            JsonRpcError::new(
                ErrorCode::MethodNotFound,
                format!("Unknown method: {unknown}"),
            ),
        ),
    }
}

fn handle_initialize(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: InitializeParams = request
        .params
        .and_then(|p| serde_json::from_value(p).ok())
        .unwrap_or_default();

    if let Some(client) = params.client_info {
        info!(
            "Initialize from {} v{} (protocol {})",
            client.name,
            client.version,
            params.protocol_version.as_deref().unwrap_or("unspecified"),
        );
    }

    state.initialized.store(true, Ordering::SeqCst);

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities::default(),
        server_info: ServerInfo {
            name: state.config.server_name.clone(),
            version: state.config.server_version.clone(),
        },
    };
    JsonRpcResponse::success(request.id, to_value(result))
}

async fn handle_tools_call(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params: ToolCallParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, err),
    };

    // An unknown tool is a routing failure, not an entity lookup failure.
    if !state.registry.has_tool(&params.name) {
        return JsonRpcResponse::error(
            id,
            JsonRpcError::new(
                ErrorCode::MethodNotFound,
                format!("Unknown tool: {}", params.name),
            ),
        );
    }

    info!("Tool call: {}", params.name);
    match state
        .registry
        .call(&params.name, &params.arguments, &state.app)
        .await
    {
        Ok(value) => JsonRpcResponse::success(id, to_value(ToolCallResult::from_value(&value))),
        Err(err) => {
            debug!("Tool {} failed: {}", params.name, err);
            JsonRpcResponse::from_domain_error(id, &err)
        }
    }
}

async fn handle_resources_read(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params: ResourceReadParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, err),
    };

    match state.resources.read(&params.uri).await {
        Ok(result) => JsonRpcResponse::success(id, to_value(result)),
        Err(err) => JsonRpcResponse::from_domain_error(id, &err),
    }
}

fn handle_prompts_get(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params: PromptGetParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, err),
    };

    match state.prompts.get(&params.name, params.arguments.as_ref()) {
        Ok(result) => JsonRpcResponse::success(id, to_value(result)),
        Err(err) => JsonRpcResponse::from_domain_error(id, &err),
    }
}

async fn handle_completion(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params: CompleteParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, err),
    };

    match state.prompts.complete(&params).await {
        Ok(result) => JsonRpcResponse::success(id, to_value(result)),
        Err(err) => JsonRpcResponse::from_domain_error(id, &err),
    }
}

fn handle_set_level(state: &ServerState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id;
    let params: SetLevelParams = match parse_params(request.params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, err),
    };

    let Some(level) = tracing_level(&params.level) else {
        return JsonRpcResponse::error(
            id,
            JsonRpcError::new(
                ErrorCode::InvalidParams,
                format!("unknown log level: {}", params.level),
            ),
        );
    };

    if let Some(ref reload) = state.log_reload {
        if let Err(e) = reload(level) {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::new(ErrorCode::InternalError, format!("cannot set level: {e}")),
            );
        }
    }
    info!("Log level set to {} ({})", params.level, level);
    JsonRpcResponse::success(id, Value::Object(Default::default()))
}

/// Map an MCP syslog-style level onto a tracing directive.
fn tracing_level(mcp_level: &str) -> Option<&'static str> {
    match mcp_level.to_ascii_lowercase().as_str() {
        "debug" => Some("debug"),
        "info" | "notice" => Some("info"),
        "warning" => Some("warn"),
        "error" | "critical" | "alert" | "emergency" => Some("error"),
        _ => None,
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> Result<T, JsonRpcError> {
    let params = params.unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {e}")))
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(tracing_level("debug"), Some("debug"));
        assert_eq!(tracing_level("notice"), Some("info"));
        assert_eq!(tracing_level("WARNING"), Some("warn"));
        assert_eq!(tracing_level("emergency"), Some("error"));
        assert_eq!(tracing_level("chatty"), None);
    }

    #[test]
    fn test_config_default_has_no_deadline() {
        let config = McpServerConfig::default();
        assert_eq!(config.server_name, "movies-mcp-server");
        assert!(config.request_timeout.is_none());
    }
}
