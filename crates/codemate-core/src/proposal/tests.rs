//! Tests for proposals

use super::*;
use crate::diff::DiffKind;
use std::path::Path;

fn workspace_with(path: &str, content: &str) -> InMemoryWorkspace {
    let mut ws = InMemoryWorkspace::new();
    ws.open(InMemoryDocument::new(path, content));
    ws
}

#[test]
fn test_extract_last_block_wins() {
    let text = "First:\n```python\nprint(1)\n```\nThen:\n```rust\n  fn main() {}\n```\n";
    let block = extract_code_block(text).unwrap();
    assert_eq!(block.language.as_deref(), Some("rust"));
    assert_eq!(block.code, "fn main() {}");
}

#[test]
fn test_extract_no_block() {
    assert!(extract_code_block("just prose, no code").is_none());
}

#[test]
fn test_extract_ignores_unterminated_fence() {
    let text = "```js\nconst a = 1;\n```\nmore coming\n```js\nconst b =";
    let block = extract_code_block(text).unwrap();
    assert_eq!(block.code, "const a = 1;");

    assert!(extract_code_block("```rust\nfn half(").is_none());
}

#[test]
fn test_extract_without_language() {
    let block = extract_code_block("```\nx = 1\n```").unwrap();
    assert_eq!(block.language, None);
    assert_eq!(block.code, "x = 1");
}

#[test]
fn test_document_ranges_count_chars() {
    let mut doc = InMemoryDocument::new("/tmp/a.py", "héllo\nwörld");
    let range = TextRange::new(Position::new(0, 1), Position::new(1, 2));
    assert_eq!(doc.text(Some(range)), "éllo\nwö");
    assert_eq!(doc.full_range().end, Position::new(1, 5));

    doc.replace(range, "X").unwrap();
    assert_eq!(doc.content(), "hXrld");
}

#[test]
fn test_propose_whole_document() {
    let ws = workspace_with("/tmp/a.py", "a\nb\nc");
    let doc = ws.active_document().unwrap();
    let change = propose_change(doc, "a\nx\nc", RequestIntent::Edit);

    assert_eq!(change.original_code, "a\nb\nc");
    assert!(change.replace_all);
    assert!(!change.applied);
    let kinds: Vec<_> = change.diff.unwrap().iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![DiffKind::Context, DiffKind::Deletion, DiffKind::Insertion, DiffKind::Context]
    );
}

#[test]
fn test_selection_overrides_replace_all() {
    let mut ws = workspace_with("/tmp/a.py", "one\ntwo\nthree");
    ws.active_mut()
        .unwrap()
        .select(TextRange::new(Position::new(1, 0), Position::new(1, 3)));

    let change = propose_change(ws.active_document().unwrap(), "TWO", RequestIntent::Fix);
    assert_eq!(change.original_code, "two");
    assert!(!change.replace_all);
}

#[test]
fn test_oversized_change_has_no_diff() {
    let big = "x\n".repeat(2500);
    let ws = workspace_with("/tmp/big.txt", &big);
    let change = propose_change(ws.active_document().unwrap(), "y", RequestIntent::Edit);
    assert!(!change.has_diff());
    assert_eq!(change.new_code, "y");
}

#[tokio::test]
async fn test_apply_twice_mutates_once() {
    let mut ws = workspace_with("/tmp/a.py", "old");
    let mut change = propose_change(ws.active_document().unwrap(), "new", RequestIntent::Edit);

    let first = apply_change(&mut ws, &mut change).await.unwrap();
    let second = apply_change(&mut ws, &mut change).await.unwrap();

    assert_eq!(first, ApplyOutcome::Applied);
    assert_eq!(second, ApplyOutcome::AlreadyApplied);
    assert_eq!(ws.get(Path::new("/tmp/a.py")).unwrap().content(), "new");
}

#[tokio::test]
async fn test_apply_inserts_at_caret() {
    let mut ws = workspace_with("/tmp/a.py", "ab");
    ws.active_mut().unwrap().set_caret(Position::new(0, 1));
    let mut change = propose_change(ws.active_document().unwrap(), "-", RequestIntent::Generate);

    apply_change(&mut ws, &mut change).await.unwrap();
    assert_eq!(ws.get(Path::new("/tmp/a.py")).unwrap().content(), "a-b");
}

#[tokio::test]
async fn test_apply_replaces_selection() {
    let mut ws = workspace_with("/tmp/a.py", "keep\nswap\nkeep");
    ws.active_mut()
        .unwrap()
        .select(TextRange::new(Position::new(1, 0), Position::new(1, 4)));
    let mut change = propose_change(ws.active_document().unwrap(), "done", RequestIntent::Edit);

    apply_change(&mut ws, &mut change).await.unwrap();
    assert_eq!(
        ws.get(Path::new("/tmp/a.py")).unwrap().content(),
        "keep\ndone\nkeep"
    );
}

#[tokio::test]
async fn test_apply_opens_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "fn a() {}").unwrap();

    let mut ws = InMemoryWorkspace::new();
    let mut change = CodeChange {
        file: path.display().to_string(),
        original_code: "fn a() {}".into(),
        new_code: "fn b() {}".into(),
        applied: false,
        replace_all: true,
        diff: None,
    };

    apply_change(&mut ws, &mut change).await.unwrap();
    assert!(change.applied);
    assert_eq!(ws.get(&path).unwrap().content(), "fn b() {}");
    assert_eq!(ws.active_document().unwrap().language(), Some("rust"));
}

#[tokio::test]
async fn test_apply_missing_file_leaves_change_unapplied() {
    let mut ws = InMemoryWorkspace::new();
    let mut change = CodeChange {
        file: "/definitely/not/here.rs".into(),
        original_code: String::new(),
        new_code: "x".into(),
        applied: false,
        replace_all: true,
        diff: None,
    };

    let err = apply_change(&mut ws, &mut change).await.unwrap_err();
    assert_eq!(err.error_code(), "CODEMATE_IO");
    assert!(!change.applied);
}

#[test]
fn test_reject_removes_entry() {
    let ws = workspace_with("/tmp/a.py", "a");
    let doc = ws.active_document().unwrap();
    let mut changes = vec![
        propose_change(doc, "b", RequestIntent::Edit),
        propose_change(doc, "c", RequestIntent::Edit),
    ];

    let removed = reject_change(&mut changes, 0).unwrap();
    assert_eq!(removed.new_code, "b");
    assert_eq!(changes.len(), 1);
    assert!(reject_change(&mut changes, 5).is_err());
}

#[test]
fn test_change_serializes_camel_case() {
    let change = CodeChange {
        file: "f".into(),
        original_code: "a".into(),
        new_code: "b".into(),
        applied: false,
        replace_all: true,
        diff: None,
    };
    let json = serde_json::to_value(&change).unwrap();
    assert_eq!(json["originalCode"], "a");
    assert_eq!(json["replaceAll"], true);
    assert!(json.get("diff").is_none());
}
