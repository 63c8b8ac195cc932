//! Sessions command implementation

use crate::console::CliConsole;
use codemate_core::session::{BlobStore, FileBlobStore, SessionStore};
use codemate_core::{CodemateConfig, CodemateResult};
use colored::*;

/// Blob store at the configured state directory or the platform default
pub(crate) fn blob_store(config: &CodemateConfig) -> CodemateResult<FileBlobStore> {
    match &config.storage.state_dir {
        Some(dir) => Ok(FileBlobStore::new(dir)),
        None => FileBlobStore::default_path(),
    }
}

/// List stored sessions, most recently updated first
pub async fn list_sessions(console: &CliConsole, config: &CodemateConfig) -> CodemateResult<()> {
    let blobs = blob_store(config)?;
    console.info(&format!("State directory: {}", blobs.base_path().display()));

    let Some(state) = blobs.load_state().await? else {
        console.warn("No stored sessions");
        return Ok(());
    };
    let store = SessionStore::from_state(state);

    console.print_header("Sessions");
    for summary in store.summaries() {
        let marker = if store.current_id() == Some(summary.id.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {}  {}  {} messages  {}",
            marker,
            summary.id.dimmed(),
            summary.title.bold(),
            summary.message_count,
            summary.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    Ok(())
}
