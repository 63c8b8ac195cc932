//! Tool commands

use super::parse_object;
use crate::console::CliConsole;
use codemate_core::mcp::{RiskLevel, TOOL_CATALOG, ToolOutcome, find_tool};
use codemate_core::{CodemateConfig, CodemateError, CodemateResult, ToolProcessClient};
use colored::*;
use serde_json::Value;

fn colored_risk(risk: RiskLevel, width: usize) -> ColoredString {
    let text = format!("{:<width$}", risk.to_string(), width = width);
    match risk {
        RiskLevel::Low => text.green(),
        RiskLevel::Medium => text.yellow(),
        RiskLevel::High => text.red().bold(),
    }
}

/// Show the tool catalog
pub fn show_tools(console: &CliConsole) {
    console.print_header("Available Tools");
    for tool in TOOL_CATALOG {
        println!(
            "  {} {} {}",
            format!("{:<28}", tool.name).magenta().bold(),
            colored_risk(tool.risk, 8),
            tool.description
        );
    }
    println!();
    println!("Total tools available: {}", TOOL_CATALOG.len());
}

/// Run a tool after confirming on the terminal
pub async fn run_tool(
    console: &CliConsole,
    config: &CodemateConfig,
    name: &str,
    args: &str,
    yes: bool,
) -> CodemateResult<()> {
    let spec = find_tool(name)
        .ok_or_else(|| CodemateError::invalid_input(format!("Unknown tool {}", name)))?;
    let mut arguments = parse_object("args", args)?;
    if name.starts_with("git_") {
        if let Some(map) = arguments.as_object_mut() {
            map.entry("repo_path").or_insert_with(|| {
                Value::String(config.sidecar.repo_path.display().to_string())
            });
        }
    }

    if !yes {
        println!("{} ({} risk)", spec.description, colored_risk(spec.risk, 0));
        println!("{}", serde_json::to_string_pretty(&arguments)?.dimmed());
        if !console.confirm(&format!("Run {}?", name))? {
            console.warn(&format!("Skipped {}", name));
            return Ok(());
        }
    }

    let client = ToolProcessClient::new(config.tool_server.clone());
    let outcome = ToolOutcome::from_value(client.call(name, arguments).await?);
    if outcome.ok {
        console.success(&outcome.summary());
    } else {
        console.error(&outcome.summary());
    }
    if let Some(data) = &outcome.data {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}
