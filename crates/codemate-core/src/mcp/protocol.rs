//! JSON-RPC envelopes for the tool handshake

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Protocol version sent in `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved request ids, one per handshake step
pub const INITIALIZE_ID: i64 = 1;
pub const LIST_TOOLS_ID: i64 = 2;
pub const CALL_TOOL_ID: i64 = 3;

/// MCP method names
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Request ID (can be string or number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// The three requests written for one tool call, in order
pub fn handshake(tool: &str, arguments: Value) -> [McpRequest; 3] {
    [
        McpRequest::new(INITIALIZE_ID, methods::INITIALIZE).with_params(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "clientInfo": {"name": "codemate", "version": env!("CARGO_PKG_VERSION")},
            "capabilities": {},
        })),
        McpRequest::new(LIST_TOOLS_ID, methods::TOOLS_LIST).with_params(json!({})),
        McpRequest::new(CALL_TOOL_ID, methods::TOOLS_CALL).with_params(json!({
            "name": tool,
            "arguments": arguments,
        })),
    ]
}

/// Whether a parsed line is the response to the invoke request
pub fn is_call_response(envelope: &Value) -> bool {
    envelope.get("id").and_then(Value::as_i64) == Some(CALL_TOOL_ID)
}

/// The tool payload of a response.
///
/// Servers wrap the payload as JSON text in `result.content[0].text`; when
/// that text parses it is returned, otherwise the raw envelope is.
pub fn unwrap_payload(envelope: Value) -> Value {
    let nested = envelope
        .pointer("/result/content/0/text")
        .and_then(Value::as_str)
        .and_then(|text| serde_json::from_str::<Value>(text).ok());
    nested.unwrap_or(envelope)
}
