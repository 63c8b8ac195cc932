//! CodeMate Core Library
//!
//! The editor-independent half of CodeMate: turning model replies into
//! reviewable code proposals, confirming risky actions with the user,
//! running tools over a spawned MCP server and keeping the agent sidecar
//! alive.

pub mod config;
pub mod confirm;
pub mod diff;
pub mod error;
pub mod events;
pub mod llm;
pub mod mcp;
pub mod proposal;
pub mod session;
pub mod sidecar;
pub mod workflow;

// Re-export commonly used types
pub use config::{CodemateConfig, load_config};
pub use confirm::ConfirmationBroker;
pub use diff::{DiffKind, DiffLine, TextDiff};
pub use error::{CodemateError, CodemateResult};
pub use events::{EventSink, InboundEvent, OutboundEvent};
pub use llm::{ModelClient, ModelRequest};
pub use mcp::{McpError, ToolInvoker, ToolProcessClient};
pub use proposal::{CodeChange, RequestIntent, Workspace, extract_code_block};
pub use session::{FileBlobStore, SessionStore};
pub use sidecar::{AgentClient, ServiceSupervisor, SidecarStatus};
pub use workflow::{Collaborators, WorkflowController, WorkflowRuntime};
