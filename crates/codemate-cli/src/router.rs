//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, SidecarAction};
use crate::commands;
use crate::console::CliConsole;
use codemate_core::{CodemateConfig, CodemateResult};

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: CodemateConfig) -> CodemateResult<()> {
    let console = CliConsole::new(cli.verbose);

    match cli.command {
        Commands::Diff { old, new } => commands::diff::show_diff(&console, &old, &new).await,
        Commands::Extract { file } => commands::extract::extract(&console, file.as_deref()).await,
        Commands::Tools => {
            commands::tools::show_tools(&console);
            Ok(())
        }
        Commands::Tool { name, args, yes } => {
            commands::tools::run_tool(&console, &config, &name, &args, yes).await
        }
        Commands::Sidecar { action } => match action {
            SidecarAction::Status => commands::sidecar::status(&console, &config).await,
            SidecarAction::Start => commands::sidecar::start(&console, &config).await,
        },
        Commands::Agent {
            agent,
            task,
            payload,
            yes,
        } => commands::agent::run_agent(&console, &config, &agent, &task, &payload, yes).await,
        Commands::Sessions => commands::sessions::list_sessions(&console, &config).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => {
                commands::config::init(&console, &cli.config_file, force)
            }
        },
    }
}
