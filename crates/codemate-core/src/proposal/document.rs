//! Editor collaborator interface and an in-memory implementation

use crate::error::{CodemateError, CodemateResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A position in a document. `character` counts Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range between two positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An open text buffer in the editor
pub trait Document: Send + Sync {
    /// Path of the file backing the buffer
    fn path(&self) -> &Path;

    /// Language identifier, when known
    fn language(&self) -> Option<&str>;

    /// Text of the range, or of the whole document when `range` is `None`
    fn text(&self, range: Option<TextRange>) -> String;

    /// Range spanning the whole document
    fn full_range(&self) -> TextRange;

    /// Current non-empty selection
    fn selection(&self) -> Option<TextRange>;

    /// Caret position
    fn caret(&self) -> Position;

    fn replace(&mut self, range: TextRange, text: &str) -> CodemateResult<()>;

    fn insert(&mut self, at: Position, text: &str) -> CodemateResult<()>;
}

/// The set of open documents
#[async_trait]
pub trait Workspace: Send + Sync {
    /// The focused document
    fn active_document(&self) -> Option<&dyn Document>;

    /// An open document by path
    fn document(&self, path: &Path) -> Option<&dyn Document>;

    /// Mutable access to an open document by path
    fn document_mut(&mut self, path: &Path) -> Option<&mut dyn Document>;

    /// Focus the document for `path`, opening it from disk first if needed
    async fn open_or_focus(&mut self, path: &Path) -> CodemateResult<()>;
}

/// A document held entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    path: PathBuf,
    language: Option<String>,
    content: String,
    selection: Option<TextRange>,
    caret: Position,
}

impl InMemoryDocument {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = language_from_path(&path);
        Self {
            path,
            language,
            content: content.into(),
            selection: None,
            caret: Position::default(),
        }
    }

    /// Select a range; an empty range clears the selection and moves the caret
    pub fn select(&mut self, range: TextRange) {
        self.caret = range.end;
        self.selection = (!range.is_empty()).then_some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_caret(&mut self, at: Position) {
        self.caret = at;
        self.selection = None;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Byte offsets of a range, ordered
    fn span_of(&self, range: TextRange) -> (usize, usize) {
        let a = self.offset_of(range.start);
        let b = self.offset_of(range.end);
        (a.min(b), a.max(b))
    }

    /// Byte offset of a position, clamped to the document
    fn offset_of(&self, pos: Position) -> usize {
        let mut offset = 0;
        for (idx, line) in self.content.split('\n').enumerate() {
            if idx == pos.line as usize {
                let within = line
                    .char_indices()
                    .nth(pos.character as usize)
                    .map(|(i, _)| i)
                    .unwrap_or(line.len());
                return offset + within;
            }
            offset += line.len() + 1;
        }
        self.content.len()
    }

    fn end_position(&self) -> Position {
        let line = self.content.matches('\n').count();
        let last = self.content.rsplit('\n').next().unwrap_or_default();
        Position::new(line as u32, last.chars().count() as u32)
    }
}

impl Document for InMemoryDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn text(&self, range: Option<TextRange>) -> String {
        match range {
            None => self.content.clone(),
            Some(range) => {
                let (start, end) = self.span_of(range);
                self.content[start..end].to_string()
            }
        }
    }

    fn full_range(&self) -> TextRange {
        TextRange::new(Position::default(), self.end_position())
    }

    fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    fn caret(&self) -> Position {
        self.caret
    }

    fn replace(&mut self, range: TextRange, text: &str) -> CodemateResult<()> {
        let (start, end) = self.span_of(range);
        self.content.replace_range(start..end, text);
        self.selection = None;
        Ok(())
    }

    fn insert(&mut self, at: Position, text: &str) -> CodemateResult<()> {
        let offset = self.offset_of(at);
        self.content.insert_str(offset, text);
        Ok(())
    }
}

/// Open documents kept in memory; files are read from disk on first open
#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    documents: Vec<InMemoryDocument>,
    active: Option<usize>,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document and focus it
    pub fn open(&mut self, document: InMemoryDocument) {
        match self.position(document.path()) {
            Some(idx) => {
                self.documents[idx] = document;
                self.active = Some(idx);
            }
            None => {
                self.documents.push(document);
                self.active = Some(self.documents.len() - 1);
            }
        }
    }

    /// Mutable access to the focused document
    pub fn active_mut(&mut self) -> Option<&mut InMemoryDocument> {
        self.active.and_then(|idx| self.documents.get_mut(idx))
    }

    pub fn get(&self, path: &Path) -> Option<&InMemoryDocument> {
        self.position(path).map(|idx| &self.documents[idx])
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.documents.iter().position(|d| d.path() == path)
    }
}

#[async_trait]
impl Workspace for InMemoryWorkspace {
    fn active_document(&self) -> Option<&dyn Document> {
        self.active
            .and_then(|idx| self.documents.get(idx))
            .map(|d| d as &dyn Document)
    }

    fn document(&self, path: &Path) -> Option<&dyn Document> {
        self.get(path).map(|d| d as &dyn Document)
    }

    fn document_mut(&mut self, path: &Path) -> Option<&mut dyn Document> {
        let idx = self.position(path)?;
        Some(&mut self.documents[idx] as &mut dyn Document)
    }

    async fn open_or_focus(&mut self, path: &Path) -> CodemateResult<()> {
        if let Some(idx) = self.position(path) {
            self.active = Some(idx);
            return Ok(());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CodemateError::io_with_path(e.to_string(), path.display().to_string())
        })?;
        tracing::debug!(path = %path.display(), "opened document from disk");
        self.open(InMemoryDocument::new(path, content));
        Ok(())
    }
}

/// Language identifier guessed from the file extension
pub(crate) fn language_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let lang = match ext {
        "rs" => "rust",
        "py" => "python",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "go" => "go",
        "java" => "java",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "sh" => "shellscript",
        other => other,
    };
    Some(lang.to_string())
}
