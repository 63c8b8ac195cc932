//! Fenced code block extraction from model output

use regex::Regex;
use std::sync::LazyLock;

/// Opening fence with an optional language tag, body, closing fence.
/// An unterminated trailing fence never matches.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([^\n`]*)\n([\s\S]*?)```").expect("fence pattern is valid")
});

/// A code block found in assistant text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock {
    /// Language tag after the opening fence, if any
    pub language: Option<String>,
    /// Block body, trimmed
    pub code: String,
}

/// Extract the authoritative code block from the accumulated text.
///
/// When several blocks are present the last one wins.
pub fn extract_code_block(text: &str) -> Option<ExtractedBlock> {
    let caps = FENCED_BLOCK.captures_iter(text).last()?;
    let language = caps
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let code = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

    Some(ExtractedBlock {
        language,
        code: code.to_string(),
    })
}
