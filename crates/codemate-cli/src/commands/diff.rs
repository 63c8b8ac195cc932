//! Diff command implementation

use crate::console::CliConsole;
use codemate_core::diff::TextDiff;
use codemate_core::{CodemateError, CodemateResult};
use std::path::Path;

async fn read(path: &Path) -> CodemateResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CodemateError::io_with_path(e.to_string(), path.display().to_string()))
}

/// Print the line diff between two files
pub async fn show_diff(console: &CliConsole, old: &Path, new: &Path) -> CodemateResult<()> {
    let old_text = read(old).await?;
    let new_text = read(new).await?;

    let Some(diff) = TextDiff::compute(&old_text, &new_text) else {
        console.warn("Files are too large to diff");
        return Ok(());
    };
    if !diff.has_changes() {
        console.success("No differences");
        return Ok(());
    }

    console.print_header(&format!("{} → {}", old.display(), new.display()));
    console.print_diff(&diff.lines);
    console.info(&format!(
        "{} added, {} removed",
        diff.added_count(),
        diff.removed_count()
    ));
    Ok(())
}
