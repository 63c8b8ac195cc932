//! Loading configuration from file and environment

use super::model::{CodemateConfig, LogFormat};
use crate::error::{CodemateError, CodemateResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "codemate.toml";

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> CodemateResult<CodemateConfig> {
    Ok(toml::from_str(text)?)
}

/// Load configuration from `path` (or [`DEFAULT_CONFIG_FILE`]) and apply
/// environment overrides from the process environment.
pub fn load_config(path: Option<&Path>) -> CodemateResult<CodemateConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut config = match std::fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), "loaded configuration file");
            parse_config(&text).map_err(|e| {
                CodemateError::config_with_context(e.to_string(), path.display().to_string())
            })?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CodemateConfig::default(),
        Err(e) => {
            return Err(CodemateError::io_with_path(
                format!("Failed to read config: {}", e),
                path.display().to_string(),
            ));
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply `CODEMATE_*` overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut CodemateConfig, lookup: F) -> CodemateResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("CODEMATE_SIDECAR_URL") {
        config.sidecar.base_url = url;
    }
    if let Some(repo) = lookup("CODEMATE_REPO_PATH") {
        config.sidecar.repo_path = PathBuf::from(repo);
    }
    if let Some(dir) = lookup("CODEMATE_STATE_DIR") {
        config.storage.state_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup("CODEMATE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = lookup("CODEMATE_LOG_FORMAT") {
        config.logging.format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            other => {
                return Err(CodemateError::config(format!(
                    "Invalid CODEMATE_LOG_FORMAT value: {}",
                    other
                )));
            }
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = CodemateConfig::default();
        assert_eq!(config.sidecar.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.sidecar.max_attempts, 15);
        assert_eq!(config.sidecar.retry_delay, Duration::from_millis(400));
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.sidecar.endpoint("smoke_test"),
            "http://127.0.0.1:8000/agent/smoke_test"
        );
    }

    #[test]
    fn test_parse_partial_file() {
        let config = parse_config(
            r#"
[sidecar]
base_url = "http://localhost:9000/"
probe_timeout = "250ms"
retry_delay = "1s"

[tool_server]
program = "node"
args = ["server.js"]

[tool_server.env]
GITHUB_TOKEN = "x"

[logging]
format = "json"

[workflow]
known_bad_symbols = ["unwrap_or_panic"]
"#,
        )
        .unwrap();

        assert_eq!(config.sidecar.probe_timeout, Duration::from_millis(250));
        assert_eq!(config.sidecar.retry_delay, Duration::from_secs(1));
        assert_eq!(config.sidecar.max_attempts, 15);
        assert_eq!(config.sidecar.endpoint("run"), "http://localhost:9000/run");
        assert_eq!(config.tool_server.program, "node");
        assert_eq!(config.tool_server.env["GITHUB_TOKEN"], "x");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.workflow.known_bad_symbols, vec!["unwrap_or_panic"]);
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = parse_config("[sidecar]\nmax_attempts = \"many\"").unwrap_err();
        assert_eq!(err.error_code(), "CODEMATE_CONFIG");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CODEMATE_SIDECAR_URL", "http://10.0.0.2:8000/agent"),
            ("CODEMATE_STATE_DIR", "/var/lib/codemate"),
            ("CODEMATE_LOG_FORMAT", "Compact"),
        ]
        .into_iter()
        .collect();

        let mut config = CodemateConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.sidecar.base_url, "http://10.0.0.2:8000/agent");
        assert_eq!(config.storage.state_dir, Some(PathBuf::from("/var/lib/codemate")));
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_env_format() {
        let mut config = CodemateConfig::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "CODEMATE_LOG_FORMAT").then(|| "xml".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config.tool_server.program, "python3");
    }
}
