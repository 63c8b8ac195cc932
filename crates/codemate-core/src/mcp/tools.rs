//! Known tools and their results

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Risk level for tool operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Read-only, no side effects
    Low,
    /// Local, reversible changes
    Medium,
    /// Remote or hard to undo
    High,
}

impl RiskLevel {
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk - read-only operation",
            RiskLevel::Medium => "Medium risk - local changes",
            RiskLevel::High => "High risk - changes a remote repository",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// A tool the server is expected to offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub risk: RiskLevel,
}

pub const TOOL_CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "git_status",
        description: "Show short git status for a repository",
        risk: RiskLevel::Low,
    },
    ToolSpec {
        name: "git_commit",
        description: "Stage all changes and create a commit",
        risk: RiskLevel::Medium,
    },
    ToolSpec {
        name: "git_push",
        description: "Push a branch to a remote",
        risk: RiskLevel::High,
    },
    ToolSpec {
        name: "github_create_repo",
        description: "Create a GitHub repository",
        risk: RiskLevel::High,
    },
    ToolSpec {
        name: "github_update_description",
        description: "Update a GitHub repository description",
        risk: RiskLevel::High,
    },
    ToolSpec {
        name: "write_file",
        description: "Write a file in the workspace",
        risk: RiskLevel::Medium,
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOL_CATALOG.iter().find(|t| t.name == name)
}

/// Typed view of a tool payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Interpret whatever a tool call resolved with.
    ///
    /// JSON-RPC error envelopes become failed outcomes; payloads that are
    /// not outcome shaped are carried as successful `data`.
    pub fn from_value(value: Value) -> Self {
        if let Ok(outcome) = serde_json::from_value::<ToolOutcome>(value.clone()) {
            return outcome;
        }
        if let Some(err) = value.get("error").filter(|e| e.is_object()) {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("tool server error")
                .to_string();
            return Self {
                ok: false,
                message: message.clone(),
                data: None,
                error: Some(message),
            };
        }
        Self {
            ok: true,
            message: String::new(),
            data: Some(value),
            error: None,
        }
    }

    /// One-line summary for notices and chat messages
    pub fn summary(&self) -> String {
        match (&self.error, self.message.is_empty()) {
            (Some(err), true) => err.clone(),
            (Some(err), false) if *err != self.message => format!("{} ({})", self.message, err),
            (_, false) => self.message.clone(),
            (None, true) if self.ok => "Done".to_string(),
            (None, true) => "Failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_risk() {
        assert_eq!(find_tool("git_status").unwrap().risk, RiskLevel::Low);
        assert_eq!(find_tool("git_push").unwrap().risk, RiskLevel::High);
        assert!(find_tool("rm_rf").is_none());
        assert!(RiskLevel::Low < RiskLevel::High);
        assert_eq!(RiskLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_outcome_from_payload() {
        let outcome = ToolOutcome::from_value(json!({
            "ok": false,
            "message": "git push failed",
            "data": null,
            "error": "rejected"
        }));
        assert!(!outcome.ok);
        assert_eq!(outcome.summary(), "git push failed (rejected)");
    }

    #[test]
    fn test_outcome_from_error_envelope() {
        let outcome = ToolOutcome::from_value(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {"code": -32601, "message": "Unknown tool: nope"}
        }));
        assert!(!outcome.ok);
        assert_eq!(outcome.summary(), "Unknown tool: nope");
    }

    #[test]
    fn test_outcome_from_other_value() {
        let outcome = ToolOutcome::from_value(json!({"id": 3, "result": {"x": 1}}));
        assert!(outcome.ok);
        assert_eq!(outcome.summary(), "Done");
        assert_eq!(outcome.data.unwrap()["result"]["x"], 1);
    }
}
