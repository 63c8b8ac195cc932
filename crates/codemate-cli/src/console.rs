//! CLI console utilities

use codemate_core::diff::{DiffKind, DiffLine};
use codemate_core::events::{AgentStatus, EventSink, NoticeLevel, OutboundEvent};
use colored::*;
use std::io::{self, BufRead, Write};

/// CLI console for formatted output
#[derive(Debug, Clone, Copy)]
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message (verbose only)
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    pub fn print_diff(&self, lines: &[DiffLine]) {
        for line in lines {
            match line.kind {
                DiffKind::Context => println!(" {}", line.text.dimmed()),
                DiffKind::Insertion => println!("{}", format!("+{}", line.text).green()),
                DiffKind::Deletion => println!("{}", format!("-{}", line.text).red()),
            }
        }
    }

    /// Ask a yes/no question on the terminal; anything but y/yes is a no
    pub fn confirm(&self, message: &str) -> io::Result<bool> {
        print!("{} {} [y/N] ", "?".cyan().bold(), message);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

impl EventSink for CliConsole {
    fn emit(&self, event: OutboundEvent) {
        match event {
            OutboundEvent::AgentStatus { status, detail } => {
                let detail = detail.map(|d| format!(" ({})", d)).unwrap_or_default();
                match status {
                    AgentStatus::Ready => self.success(&format!("Agent service ready{}", detail)),
                    AgentStatus::Starting => self.info(&format!("Starting agent service{}", detail)),
                    AgentStatus::Error => self.error(&format!("Agent service error{}", detail)),
                    AgentStatus::Unknown => self.info("Agent service stopped"),
                }
            }
            OutboundEvent::Notice { level, message } => match level {
                NoticeLevel::Info => self.info(&message),
                NoticeLevel::Warning => self.warn(&message),
                NoticeLevel::Error => self.error(&message),
            },
            other => tracing::debug!(event = ?other, "unhandled console event"),
        }
    }
}
