//! Events sent by the UI

use crate::proposal::RequestIntent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request from the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundEvent {
    SendMessage {
        text: String,
        #[serde(default)]
        intent: RequestIntent,
    },
    ApplyChange {
        message_id: String,
        change_index: usize,
    },
    RejectChange {
        message_id: String,
        change_index: usize,
    },
    ConfirmResult {
        id: String,
        choice: Option<String>,
    },
    RunTool {
        tool: String,
        #[serde(default)]
        arguments: Value,
    },
    RunAgent {
        agent: String,
        task: String,
        #[serde(default)]
        payload: Value,
    },
    NewChat,
    SwitchSession {
        session_id: String,
    },
    ClearHistory,
    Cancel,
}

impl InboundEvent {
    /// Events handled outside the controller queue
    pub fn is_control(&self) -> bool {
        matches!(self, Self::ConfirmResult { .. } | Self::Cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_message() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type":"sendMessage","text":"fix it","intent":"fix"}"#)
                .unwrap();
        assert_eq!(
            event,
            InboundEvent::SendMessage {
                text: "fix it".into(),
                intent: RequestIntent::Fix,
            }
        );
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"type":"applyChange","messageId":"m1","changeIndex":0}"#,
        )
        .unwrap();
        assert!(matches!(event, InboundEvent::ApplyChange { change_index: 0, .. }));

        let unit: InboundEvent = serde_json::from_str(r#"{"type":"clearHistory"}"#).unwrap();
        assert_eq!(unit, InboundEvent::ClearHistory);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{"type":"launchRockets"}"#).is_err());
    }

    #[test]
    fn test_control_events() {
        assert!(InboundEvent::Cancel.is_control());
        assert!(!InboundEvent::NewChat.is_control());
    }
}
