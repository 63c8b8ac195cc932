//! CodeMate CLI application
//!
//! Terminal front end for the CodeMate core: inspect diffs and extracted
//! code, run guarded tools on the MCP server, supervise the agent sidecar
//! and browse stored chat sessions.

mod args;
mod commands;
mod console;
mod logging;
mod router;

use clap::Parser;
use codemate_core::CodemateResult;

use args::Cli;

#[tokio::main]
async fn main() -> CodemateResult<()> {
    let cli = Cli::parse();
    let config = codemate_core::load_config(Some(cli.config_file.as_path()))?;
    logging::init(&config.logging, cli.verbose);

    router::route(cli, config).await
}
