//! MCP Protocol Types (JSON-RPC 2.0)
//!
//! Implements the Model Context Protocol wire format based on JSON-RPC 2.0.
//! Reference: https://spec.modelcontextprotocol.io/
//!
//! # Wire Format
//!
//! All messages are JSON-RPC 2.0 over stdio (newline-delimited JSON).
//!
//! ## Request
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "tools/call",
//!   "params": { "name": "get_movie", "arguments": { "movie_id": 1 } }
//! }
//! ```
//!
//! ## Response (success)
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "result": { "content": [{ "type": "text", "text": "{...}" }] }
//! }
//! ```
//!
//! ## Response (error)
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "error": { "code": -32602, "message": "Invalid params", "data": { "kind": "validation" } }
//! }
//! ```

use movies_domain::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version string
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported in initialize
pub const SERVER_NAME: &str = "movies-mcp-server";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0"
    pub jsonrpc: String,

    /// Request ID. Absent (or null) means the message is a notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    /// Method name
    pub method: String,

    /// Parameters (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// A message without an ID is a notification: it never gets a response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Must be "2.0"
    pub jsonrpc: String,

    /// Request ID (must match request; null for parse errors)
    pub id: Option<RequestId>,

    /// Result (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Map a domain error onto the wire.
    ///
    /// This is the only place the domain's closed error set turns into
    /// JSON-RPC codes. The category travels in `data.kind`.
    pub fn from_domain_error(id: Option<RequestId>, err: &DomainError) -> Self {
        let code = match err {
            DomainError::StoreUnavailable(_) => ErrorCode::InternalError,
            _ => ErrorCode::InvalidParams,
        };
        Self::error(
            id,
            JsonRpcError::with_data(
                code,
                err.to_string(),
                serde_json::json!({ "kind": err.kind() }),
            ),
        )
    }
}

/// Request ID (number or string per JSON-RPC spec; null is carried as None)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Human-readable message
    pub message: String,

    /// Additional data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_i32(),
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.as_i32(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Standard JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON (-32700)
    ParseError,
    /// Invalid request object (-32600)
    InvalidRequest,
    /// Method not found (-32601)
    MethodNotFound,
    /// Invalid method parameters (-32602)
    InvalidParams,
    /// Internal error (-32603)
    InternalError,
}

impl ErrorCode {
    /// Convert to JSON-RPC error code
    pub fn as_i32(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

// ============================================================================
// MCP-Specific Message Types
// ============================================================================

/// MCP Initialize request params. Clients vary; everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub capabilities: Option<Value>,

    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Client info
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// MCP Initialize result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Advertised capability set: tools, resources, and prompts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    pub tools: EmptyCapability,
    pub resources: EmptyCapability,
    pub prompts: EmptyCapability,
}

/// A capability advertised with no sub-options, serialized as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyCapability {}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// ============================================================================
// Tools
// ============================================================================

/// Tool definition for tools/list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (e.g., "search_movies")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,
}

/// Tools list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

/// Tool call params
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ContentBlock>,
}

impl ToolCallResult {
    /// Wrap a handler's return value as canonical JSON text content.
    pub fn from_value(value: &Value) -> Self {
        let text = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
        Self {
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Content block in tool and prompt results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content
    #[serde(rename = "text")]
    Text { text: String },
}

impl ContentBlock {
    /// Create a text content block
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Resource descriptor for resources/list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Resources list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesListResult {
    pub resources: Vec<ResourceDescriptor>,
}

/// Resource templates list result (this server registers none)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplatesListResult {
    pub resource_templates: Vec<Value>,
}

/// resources/read params
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

/// One element of a resources/read `contents` array. Text payloads carry
/// `text`; binary payloads carry base64 in `blob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

impl ResourceContent {
    pub fn text(uri: impl Into<String>, mime_type: impl Into<String>, text: String) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            text: Some(text),
            blob: None,
        }
    }

    /// Binary payload, base64-encoded for the wire.
    pub fn blob(uri: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine;
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            text: None,
            blob: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
        }
    }
}

/// resources/read result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesReadResult {
    pub contents: Vec<ResourceContent>,
}

// ============================================================================
// Prompts
// ============================================================================

/// Prompt argument descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Prompt descriptor for prompts/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

/// Prompts list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsListResult {
    pub prompts: Vec<PromptDescriptor>,
}

/// prompts/get params
#[derive(Debug, Clone, Deserialize)]
pub struct PromptGetParams {
    pub name: String,

    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One message of a rendered prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: ContentBlock,
}

/// prompts/get result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetResult {
    pub description: String,
    pub messages: Vec<PromptMessage>,
}

// ============================================================================
// Completion
// ============================================================================

/// completion/complete params
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteParams {
    /// What is being completed: a prompt or resource-template reference.
    #[serde(rename = "ref")]
    pub reference: CompletionRef,

    pub argument: CompletionArgument,
}

/// Reference part of a completion request
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRef {
    #[serde(rename = "type")]
    pub ref_type: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub uri: Option<String>,
}

/// Argument part of a completion request
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionArgument {
    pub name: String,

    #[serde(default)]
    pub value: String,
}

/// completion/complete result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResult {
    pub completion: Completion,
}

/// The completion values themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub values: Vec<String>,
    pub total: usize,
    pub has_more: bool,
}

// ============================================================================
// Logging
// ============================================================================

/// logging/setLevel params
#[derive(Debug, Clone, Deserialize)]
pub struct SetLevelParams {
    pub level: String,
}

// ============================================================================
// MCP Methods
// ============================================================================

/// Known MCP methods
pub mod methods {
    /// Initialize the connection
    pub const INITIALIZE: &str = "initialize";
    /// Notification that initialization is complete
    pub const INITIALIZED: &str = "notifications/initialized";
    /// List available tools
    pub const TOOLS_LIST: &str = "tools/list";
    /// Call a tool
    pub const TOOLS_CALL: &str = "tools/call";
    /// List available resources
    pub const RESOURCES_LIST: &str = "resources/list";
    /// Read a resource by URI
    pub const RESOURCES_READ: &str = "resources/read";
    /// List resource templates
    pub const RESOURCES_TEMPLATES_LIST: &str = "resources/templates/list";
    /// List available prompts
    pub const PROMPTS_LIST: &str = "prompts/list";
    /// Render a prompt
    pub const PROMPTS_GET: &str = "prompts/get";
    /// Complete a prompt or template argument
    pub const COMPLETION_COMPLETE: &str = "completion/complete";
    /// Adjust the server log level
    pub const LOGGING_SET_LEVEL: &str = "logging/setLevel";
}
