//! Events sent to the UI

use crate::session::{Message, SessionSummary};
use serde::{Deserialize, Serialize};

/// Sidecar lifecycle as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Unknown,
    Starting,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// An update for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    MessageAdded {
        message: Message,
    },
    MessageUpdated {
        message: Message,
    },
    ConfirmAction {
        id: String,
        title: String,
        detail: String,
        choices: Vec<String>,
    },
    AgentStatus {
        status: AgentStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    SessionList {
        sessions: Vec<SessionSummary>,
        current_session_id: Option<String>,
    },
    Notice {
        level: NoticeLevel,
        message: String,
    },
}

impl OutboundEvent {
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self::Notice {
            level,
            message: message.into(),
        }
    }
}
