//! Code change proposals
//!
//! A proposal is the code block extracted from an assistant reply, paired with
//! the text it would replace and a diff between the two. Proposals live on the
//! owning message until they are applied (and become immutable) or rejected
//! (and are removed).

mod change;
mod document;
mod extract;
mod lifecycle;

#[cfg(test)]
mod tests;

pub use change::{CodeChange, RequestIntent};
pub use document::{Document, InMemoryDocument, InMemoryWorkspace, Position, TextRange, Workspace};
pub use extract::{ExtractedBlock, extract_code_block};
pub use lifecycle::{ApplyOutcome, apply_change, propose_change, reject_change};
