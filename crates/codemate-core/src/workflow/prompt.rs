//! Prompts sent to the model

use crate::llm::ModelRequest;
use crate::proposal::RequestIntent;

const SYSTEM_PROMPT: &str = "You are CodeMate, a coding assistant inside the user's editor. \
Answer concisely. When you change or write code, return the complete result in a single \
fenced code block.";

const STRICT_FIX_PROMPT: &str = "You are CodeMate. Return ONLY the corrected code in one \
fenced code block. Do not explain. Do not leave anything out.";

/// The part of a document a request is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub file: String,
    pub language: Option<String>,
    pub code: String,
    /// Whether `code` is a selection rather than the whole file
    pub is_selection: bool,
}

fn fenced(snapshot: &DocumentSnapshot) -> String {
    format!(
        "```{}\n{}\n```",
        snapshot.language.as_deref().unwrap_or_default(),
        snapshot.code
    )
}

/// Prompt for a user request
pub fn build_request(
    text: &str,
    intent: RequestIntent,
    snapshot: Option<&DocumentSnapshot>,
) -> ModelRequest {
    let Some(doc) = snapshot else {
        return ModelRequest::new(SYSTEM_PROMPT, text);
    };

    let scope = if doc.is_selection {
        "the selected code"
    } else {
        "the file"
    };
    let instruction = match intent {
        RequestIntent::Ask => format!("Question about {} `{}`:", scope, doc.file),
        RequestIntent::Generate => {
            format!("Write new code for `{}`. Return only the new code.", doc.file)
        }
        RequestIntent::Edit => format!("Rewrite {} `{}` as requested.", scope, doc.file),
        RequestIntent::Fix => format!("Fix the problems in {} `{}`.", scope, doc.file),
    };

    let prompt = format!("{}\n\n{}\n\nRequest: {}", instruction, fenced(doc), text);
    ModelRequest::new(SYSTEM_PROMPT, prompt)
}

/// Stricter prompt for the single regeneration of a fix
pub fn fix_retry_request(
    text: &str,
    snapshot: Option<&DocumentSnapshot>,
    known_bad_symbols: &[String],
) -> ModelRequest {
    let mut prompt = String::new();
    if let Some(doc) = snapshot {
        prompt.push_str(&format!("Code from `{}`:\n{}\n\n", doc.file, fenced(doc)));
    }
    prompt.push_str(&format!("Fix request: {}\n", text));
    if !known_bad_symbols.is_empty() {
        prompt.push_str(&format!(
            "These identifiers do not exist, do not use them: {}\n",
            known_bad_symbols.join(", ")
        ));
    }
    prompt.push_str("Reply with exactly one fenced code block containing the full corrected code.");
    ModelRequest::new(STRICT_FIX_PROMPT, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DocumentSnapshot {
        DocumentSnapshot {
            file: "src/lib.rs".into(),
            language: Some("rust".into()),
            code: "fn a() {}".into(),
            is_selection: true,
        }
    }

    #[test]
    fn test_request_without_document() {
        let req = build_request("hello", RequestIntent::Ask, None);
        assert_eq!(req.prompt, "hello");
    }

    #[test]
    fn test_request_includes_code() {
        let req = build_request("make it public", RequestIntent::Edit, Some(&snapshot()));
        assert!(req.prompt.contains("```rust\nfn a() {}\n```"));
        assert!(req.prompt.contains("the selected code"));
        assert!(req.prompt.ends_with("Request: make it public"));
    }

    #[test]
    fn test_retry_lists_bad_symbols() {
        let req = fix_retry_request("fix", Some(&snapshot()), &["frobnicate".to_string()]);
        assert!(req.prompt.contains("do not use them: frobnicate"));
        assert_ne!(req.system, build_request("fix", RequestIntent::Fix, None).system);
    }
}
