/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC message format that MCP clients use to
/// talk to the server, plus the MCP payloads carried inside those messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Newest MCP protocol version we speak
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Every protocol version we can negotiate, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// JSON-RPC correlation token
///
/// JSON-RPC allows strings and numbers. The two are kept distinct: the
/// string "1" and the number 1 are different requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// JSON-RPC 2.0 request message
///
/// A request without an `id` is a notification and gets no response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Correlation token; absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    /// Parameters for the method call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response message
///
/// Carries either a result or an error. `id` is null only when the request
/// it answers could not be decoded far enough to read its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Option<RequestId>,
    /// Successful result (if no error occurred)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC codes)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP tool call parameters
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "hello_world")
    pub name: String,
    /// Arguments to pass to the tool; validated as an object later
    #[serde(default)]
    pub arguments: Value,
}

/// MCP tool call result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Tool execution results
    pub content: Vec<ToolContent>,
    /// Machine-readable copy of a structured result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Whether this is an error result
    #[serde(default)]
    pub is_error: bool,
}

/// Content returned by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    /// Type of content (always "text" here)
    #[serde(rename = "type")]
    pub content_type: String,
    /// The actual content/result
    pub text: String,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// MCP tool definition as listed by `tools/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

/// MCP server capabilities
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Whether we notify clients when the tool list changes (never: the registry is frozen)
    pub list_changed: bool,
}

/// MCP initialization request
///
/// Only the protocol version matters to us; the rest is accepted as-is so
/// that clients sending extra or missing fields are not turned away.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Information about the MCP client
#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// MCP initialization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Information about this server
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Parameters of `notifications/cancelled`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledParams {
    /// Id of the request to cancel
    pub request_id: RequestId,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Method names handled by the server
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const CANCELLED: &str = "notifications/cancelled";
}

// JSON-RPC error codes (standard codes)
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters - Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<RequestId>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message, data }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl ToolCallResult {
    /// Create a successful tool result with text content
    pub fn success(text: String) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            structured_content: None,
            is_error: false,
        }
    }

    /// Create a successful tool result carrying structured content
    ///
    /// The value is also rendered as compact JSON text for clients that only
    /// read `content`.
    pub fn structured(value: Value) -> Self {
        Self {
            content: vec![ToolContent::text(value.to_string())],
            structured_content: Some(value),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(error_message: String) -> Self {
        Self {
            content: vec![ToolContent::text(error_message)],
            structured_content: None,
            is_error: true,
        }
    }
}

/// Pick the protocol version to answer `initialize` with
///
/// Echo the client's version if we support it, otherwise offer our latest
/// and let the client decide whether to continue.
pub fn negotiate_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}
