//! LCS based text diff

use serde::{Deserialize, Serialize};

/// Maximum number of lines on either side before the diff is skipped
pub const MAX_DIFF_LINES: usize = 2000;

/// Maximum size of the LCS table (old lines times new lines)
pub const MAX_DIFF_CELLS: usize = 4_000_000;

/// Kind of a single diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Context,
    Insertion,
    Deletion,
}

/// A diff line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
}

impl DiffLine {
    pub fn context(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Context,
            text: text.into(),
        }
    }

    pub fn insertion(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Insertion,
            text: text.into(),
        }
    }

    pub fn deletion(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Deletion,
            text: text.into(),
        }
    }
}

/// An ordered edit script turning the old lines into the new lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextDiff {
    pub lines: Vec<DiffLine>,
}

impl TextDiff {
    /// Compute the diff between two strings.
    ///
    /// Returns `None` when either side is too large to diff.
    pub fn compute(old: &str, new: &str) -> Option<Self> {
        let old_lines: Vec<&str> = old.split('\n').collect();
        let new_lines: Vec<&str> = new.split('\n').collect();
        diff_lines(&old_lines, &new_lines).map(|lines| Self { lines })
    }

    /// Format diff with ` `, `+` and `-` prefixes, one line per entry
    pub fn format_unified(&self) -> String {
        let mut output = String::new();
        for line in &self.lines {
            let prefix = match line.kind {
                DiffKind::Context => ' ',
                DiffKind::Insertion => '+',
                DiffKind::Deletion => '-',
            };
            output.push(prefix);
            output.push_str(&line.text);
            output.push('\n');
        }
        output
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.kind != DiffKind::Context)
    }

    /// Count added lines
    pub fn added_count(&self) -> usize {
        self.count(DiffKind::Insertion)
    }

    /// Count removed lines
    pub fn removed_count(&self) -> usize {
        self.count(DiffKind::Deletion)
    }

    fn count(&self, kind: DiffKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }

    /// Lines of the old side, in order
    pub fn old_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.kind != DiffKind::Insertion)
            .map(|l| l.text.as_str())
            .collect()
    }

    /// Lines of the new side, in order
    pub fn new_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.kind != DiffKind::Deletion)
            .map(|l| l.text.as_str())
            .collect()
    }
}

/// Compute the edit script between two line sequences.
///
/// On a tie the deletion is emitted before the insertion.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> Option<Vec<DiffLine>> {
    let n = old.len();
    let m = new.len();
    if n > MAX_DIFF_LINES || m > MAX_DIFF_LINES {
        return None;
    }
    match n.checked_mul(m) {
        Some(cells) if cells <= MAX_DIFF_CELLS => {}
        _ => return None,
    }

    // table[i][j] = LCS length of old[i..] and new[j..], flattened row-major
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i].as_ref() == new[j].as_ref() {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i].as_ref() == new[j].as_ref() {
            out.push(DiffLine::context(old[i].as_ref()));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            out.push(DiffLine::deletion(old[i].as_ref()));
            i += 1;
        } else {
            out.push(DiffLine::insertion(new[j].as_ref()));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|l| DiffLine::deletion(l.as_ref())));
    out.extend(new[j..].iter().map(|l| DiffLine::insertion(l.as_ref())));

    Some(out)
}
