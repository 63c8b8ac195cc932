//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use codemate_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codemate")]
#[command(about = "CodeMate - review model-generated code and run guarded repository tools")]
#[command(
    long_about = r#"CodeMate - review model-generated code and run guarded repository tools

USAGE:
  codemate diff old.rs new.rs        # Line diff between two files
  codemate extract reply.md          # Pull the last fenced code block out of a reply
  codemate tools                     # List tools and their risk levels
  codemate tool git_status           # Run a tool on the MCP server (asks first)
  codemate sidecar start             # Make sure the agent service is up
  codemate agent git push            # Run an agent task on the sidecar
  codemate sessions                  # List stored chat sessions

For detailed help: codemate --help"#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the line diff between two files
    Diff {
        old: PathBuf,
        new: PathBuf,
    },

    /// Print the last fenced code block of a model reply (stdin when no file)
    Extract { file: Option<PathBuf> },

    /// List the tools known to the tool server and their risk levels
    Tools,

    /// Run one tool on a freshly spawned tool server
    Tool {
        /// Tool name, e.g. git_status
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Run without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Manage the agent sidecar
    Sidecar {
        #[command(subcommand)]
        action: SidecarAction,
    },

    /// Run an agent task on the sidecar, starting it when needed
    Agent {
        agent: String,
        task: String,

        /// Extra payload fields as a JSON object
        #[arg(long, default_value = "{}")]
        payload: String,

        /// Run without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// List stored chat sessions
    Sessions,

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum SidecarAction {
    /// Probe the sidecar once
    Status,

    /// Start the sidecar unless it already answers, and wait until it does
    Start,
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigAction {
    /// Display the effective configuration, environment overrides included
    Show,

    /// Create a configuration file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
