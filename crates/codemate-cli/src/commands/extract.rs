//! Extract command implementation

use crate::console::CliConsole;
use codemate_core::{CodemateError, CodemateResult, extract_code_block};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Print the last fenced block of a reply read from `file` or stdin
pub async fn extract(console: &CliConsole, file: Option<&Path>) -> CodemateResult<()> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            CodemateError::io_with_path(e.to_string(), path.display().to_string())
        })?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };

    match extract_code_block(&text) {
        Some(block) => {
            console.info(&format!(
                "language: {}",
                block.language.as_deref().unwrap_or("none")
            ));
            println!("{}", block.code);
            Ok(())
        }
        None => Err(CodemateError::not_found("a fenced code block in the input")),
    }
}
