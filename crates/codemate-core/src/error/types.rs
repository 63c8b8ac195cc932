//! Core error type for CodeMate

use thiserror::Error;

/// Result type alias for CodeMate operations
pub type CodemateResult<T> = Result<T, CodemateError>;

/// Main error type for CodeMate
#[derive(Error, Debug, Clone)]
pub enum CodemateError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The request cannot be served with the current editor state
    /// (no active document, no selection, unknown session)
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        context: Option<String>,
    },

    /// A message id or change index does not resolve
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
    },

    /// Process spawn, pipe or health-probe failures
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        context: Option<String>,
    },

    /// Model collaborator errors
    #[error("Model error: {message}")]
    Model { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// HTTP request errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// Persisted state could not be read or written
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Generic error
    #[error("Error: {message}")]
    Other { message: String },
}

impl CodemateError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CODEMATE_CONFIG",
            Self::InvalidInput { .. } => "CODEMATE_INVALID_INPUT",
            Self::NotFound { .. } => "CODEMATE_NOT_FOUND",
            Self::Transport { .. } => "CODEMATE_TRANSPORT",
            Self::Model { .. } => "CODEMATE_MODEL",
            Self::Io { .. } => "CODEMATE_IO",
            Self::Json { .. } => "CODEMATE_JSON",
            Self::Http { .. } => "CODEMATE_HTTP",
            Self::Storage { .. } => "CODEMATE_STORAGE",
            Self::Other { .. } => "CODEMATE_OTHER",
        }
    }

    /// Short text for a user-visible notice
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { message, .. } => message.clone(),
            Self::NotFound { message, .. } => format!("Could not find {}", message),
            Self::Transport { message, .. } => format!("Connection problem: {}", message),
            other => other.to_string(),
        }
    }
}

/// Extension trait for turning a missing value into a not-found error
pub trait OptionExt<T> {
    /// Convert `None` into `CodemateError::NotFound` naming the resource
    fn or_not_found(self, what: impl Into<String>) -> CodemateResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, what: impl Into<String>) -> CodemateResult<T> {
        self.ok_or_else(|| CodemateError::not_found(what))
    }
}
