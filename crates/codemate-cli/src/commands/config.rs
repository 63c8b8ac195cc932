//! Configuration commands

use crate::console::CliConsole;
use codemate_core::{CodemateConfig, CodemateError, CodemateResult};
use std::path::Path;

fn to_toml(config: &CodemateConfig) -> CodemateResult<String> {
    toml::to_string_pretty(config)
        .map_err(|e| CodemateError::config(format!("Failed to serialize configuration: {}", e)))
}

/// Print the effective configuration
pub fn show(config: &CodemateConfig) -> CodemateResult<()> {
    print!("{}", to_toml(config)?);
    Ok(())
}

/// Write a default configuration file
pub fn init(console: &CliConsole, path: &Path, force: bool) -> CodemateResult<()> {
    if path.exists() && !force {
        return Err(CodemateError::invalid_input(format!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        )));
    }

    std::fs::write(path, to_toml(&CodemateConfig::default())?)
        .map_err(|e| CodemateError::io_with_path(e.to_string(), path.display().to_string()))?;
    console.success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemate_core::config::parse_config;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codemate.toml");
        let console = CliConsole::new(false);

        init(&console, &path, false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_config(&text).unwrap(), CodemateConfig::default());

        assert!(init(&console, &path, false).is_err());
        assert!(init(&console, &path, true).is_ok());
    }
}
