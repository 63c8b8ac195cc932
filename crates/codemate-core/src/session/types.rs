//! Session and message types

use crate::proposal::{CodeChange, TextRange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for sessions
pub type SessionId = String;

/// Unique identifier for messages
pub type MessageId = String;

/// Title of a session before its first user message
pub const DEFAULT_TITLE: &str = "New chat";

const TITLE_MAX_CHARS: usize = 40;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Document a request was made against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContext {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<TextRange>,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_context: Option<FileContext>,
    /// Only set on assistant messages that completed with a code block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_changes: Option<Vec<CodeChange>>,
    /// Placeholder shown until the first chunk of real content arrives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            file_context: None,
            code_changes: None,
            thinking: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn with_file_context(mut self, context: FileContext) -> Self {
        self.file_context = Some(context);
        self
    }

    pub fn with_thinking(mut self, placeholder: impl Into<String>) -> Self {
        self.thinking = Some(placeholder.into());
        self
    }

    /// Mutable access to a change by index
    pub fn change_mut(&mut self, index: usize) -> Option<&mut CodeChange> {
        self.code_changes.as_mut()?.get_mut(index)
    }
}

/// A chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and update the timestamp
    pub fn add_message(&mut self, message: Message) {
        if message.role == Role::User && self.title == DEFAULT_TITLE {
            if let Some(title) = title_from(&message.content) {
                self.title = title;
            }
        }
        self.messages.push(message);
        self.touch();
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn title_from(content: &str) -> Option<String> {
    let first_line = content.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(first_line.chars().take(TITLE_MAX_CHARS).collect())
}

/// Summary of a session for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            message_count: session.messages.len(),
            updated_at: session.updated_at,
        }
    }
}

/// Everything written to the blob store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub current_session_id: Option<SessionId>,
}
