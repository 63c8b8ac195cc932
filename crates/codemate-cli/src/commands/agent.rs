//! Agent command implementation

use super::parse_object;
use super::sidecar::supervisor;
use crate::console::CliConsole;
use codemate_core::sidecar::{AgentClient, AgentRunner};
use codemate_core::{CodemateConfig, CodemateError, CodemateResult};
use colored::*;
use serde_json::Value;

/// Run an agent task on the sidecar, starting it when needed
pub async fn run_agent(
    console: &CliConsole,
    config: &CodemateConfig,
    agent: &str,
    task: &str,
    payload: &str,
    yes: bool,
) -> CodemateResult<()> {
    let mut payload = parse_object("payload", payload)?;
    if let Some(map) = payload.as_object_mut() {
        map.entry("repo_path")
            .or_insert_with(|| Value::String(config.sidecar.repo_path.display().to_string()));
    }

    if !yes {
        println!("{}", serde_json::to_string_pretty(&payload)?.dimmed());
        if !console.confirm(&format!("Run {} / {}?", agent, task))? {
            console.warn(&format!("Skipped {}", task));
            return Ok(());
        }
    }

    if !supervisor(console, config).ensure_running().await {
        return Err(CodemateError::transport("Agent service is not available"));
    }

    let result = AgentClient::new(&config.sidecar)
        .run(agent, task, payload)
        .await?;
    if result.is_success() {
        console.success(&format!("{} {}: {}", agent, task, result.status));
    } else {
        console.error(&format!(
            "{} {}: {} {}",
            agent,
            task,
            result.status,
            result.error.as_deref().unwrap_or_default()
        ));
    }
    if !result.details.is_empty() {
        println!("{}", result.details);
    }
    if let Some(artifacts) = &result.artifacts {
        println!("{}", serde_json::to_string_pretty(artifacts)?);
    }
    Ok(())
}
