//! Tool calls over a spawned MCP server
//!
//! Every call spawns a fresh server process, runs the fixed three-step
//! handshake over newline-delimited JSON-RPC on stdin/stdout, waits for the
//! reply to the invoke request and tears the process down.

mod client;
mod error;
pub mod protocol;
mod tools;

pub use client::{ToolInvoker, ToolProcessClient};
pub use error::McpError;
pub use protocol::{McpRequest, RequestId};
pub use tools::{RiskLevel, TOOL_CATALOG, ToolOutcome, ToolSpec, find_tool};
