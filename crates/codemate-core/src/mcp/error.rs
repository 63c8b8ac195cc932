//! MCP error types

use thiserror::Error;

/// Errors raised while talking to a tool server
#[derive(Debug, Error, Clone)]
pub enum McpError {
    /// The server could not be started or its pipes were unavailable
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        context: Option<String>,
    },

    /// Writing to or reading from the server failed, or it exited early
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        context: Option<String>,
    },

    /// A request could not be encoded
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        context: Option<String>,
    },
}

impl McpError {
    /// Create a new Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to any MCP error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Connection { context: c, .. }
            | Self::Transport { context: c, .. }
            | Self::Serialization { context: c, .. } => *c = ctx,
        }
        self
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "MCP_CONNECTION",
            Self::Transport { .. } => "MCP_TRANSPORT",
            Self::Serialization { .. } => "MCP_SERIALIZATION",
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Connection { context, .. }
            | Self::Transport { context, .. }
            | Self::Serialization { context, .. } => context.as_deref(),
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        Self::transport(err.to_string())
    }
}
