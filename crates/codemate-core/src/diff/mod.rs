//! Line-level diff between an original and a proposed text
//!
//! The edit script is computed with a classic LCS table. Inputs beyond
//! [`MAX_DIFF_LINES`] lines per side or [`MAX_DIFF_CELLS`] table cells are
//! not diffed at all; callers fall back to showing the raw new text.

mod text_diff;


pub use text_diff::{DiffKind, DiffLine, MAX_DIFF_CELLS, MAX_DIFF_LINES, TextDiff, diff_lines};
