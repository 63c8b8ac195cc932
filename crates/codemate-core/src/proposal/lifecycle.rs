//! Proposal creation, apply and reject

use super::change::{CodeChange, RequestIntent};
use super::document::{Document, Workspace};
use crate::diff::TextDiff;
use crate::error::{CodemateError, CodemateResult, OptionExt};
use std::path::PathBuf;

/// Result of an apply request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The document was mutated
    Applied,
    /// The change had been applied before; nothing was touched
    AlreadyApplied,
}

/// Build a proposal for `new_code` against the document's current state.
///
/// An active selection always narrows the change to that selection, even
/// when the request asked to replace the whole document.
pub fn propose_change(document: &dyn Document, new_code: &str, intent: RequestIntent) -> CodeChange {
    let selection = document.selection();
    let original_code = document.text(selection);
    let diff = TextDiff::compute(&original_code, new_code).map(|d| d.lines);
    if diff.is_none() {
        tracing::debug!(file = %document.path().display(), "change too large to diff");
    }

    CodeChange {
        file: document.path().display().to_string(),
        original_code,
        new_code: new_code.to_string(),
        applied: false,
        replace_all: intent.replaces_document() && selection.is_none(),
        diff,
    }
}

/// Apply a proposal to its file, opening the file first when needed.
///
/// Performs exactly one mutation. On error the change stays unapplied.
pub async fn apply_change(
    workspace: &mut dyn Workspace,
    change: &mut CodeChange,
) -> CodemateResult<ApplyOutcome> {
    if change.applied {
        return Ok(ApplyOutcome::AlreadyApplied);
    }

    let path = PathBuf::from(&change.file);
    if workspace.document_mut(&path).is_none() {
        workspace.open_or_focus(&path).await?;
    }
    let document = workspace
        .document_mut(&path)
        .or_not_found(format!("document {}", change.file))?;

    if change.replace_all {
        let range = document.full_range();
        document.replace(range, &change.new_code)?;
    } else if let Some(selection) = document.selection() {
        document.replace(selection, &change.new_code)?;
    } else {
        let caret = document.caret();
        document.insert(caret, &change.new_code)?;
    }

    change.applied = true;
    tracing::info!(file = %change.file, replace_all = change.replace_all, "applied change");
    Ok(ApplyOutcome::Applied)
}

/// Remove a proposal from its message's change list
pub fn reject_change(changes: &mut Vec<CodeChange>, index: usize) -> CodemateResult<CodeChange> {
    let change = changes
        .get(index)
        .or_not_found(format!("change {}", index))?;
    if change.applied {
        return Err(CodemateError::invalid_input(
            "Change was already applied and can no longer be rejected",
        ));
    }
    Ok(changes.remove(index))
}
