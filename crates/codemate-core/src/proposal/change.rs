//! Code change attached to an assistant message

use crate::diff::DiffLine;
use serde::{Deserialize, Serialize};

/// What the user asked for, as classified by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestIntent {
    /// Free-form question; any code is inserted at the caret
    #[default]
    Ask,
    /// Produce new code to insert at the caret
    Generate,
    /// Rewrite the current document or selection
    Edit,
    /// Repair the current document or selection
    Fix,
}

impl RequestIntent {
    /// Whether the request asks to replace the whole document
    pub fn replaces_document(self) -> bool {
        matches!(self, Self::Edit | Self::Fix)
    }

    pub fn is_fix(self) -> bool {
        self == Self::Fix
    }
}

/// A proposed change to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChange {
    pub file: String,
    pub original_code: String,
    pub new_code: String,
    #[serde(default)]
    pub applied: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replace_all: bool,
    /// Absent when the inputs were too large to diff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<Vec<DiffLine>>,
}

impl CodeChange {
    pub fn has_diff(&self) -> bool {
        self.diff.is_some()
    }
}
