//! Configuration data model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodemateConfig {
    pub sidecar: SidecarConfig,
    pub tool_server: ToolServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub workflow: WorkflowConfig,
}

/// The long-lived agent service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
    /// Base URL; `/smoke_test` and `/run` are resolved against it
    pub base_url: String,
    /// Program used to start the service
    pub program: String,
    /// Arguments passed to `program`
    pub args: Vec<String>,
    /// File that must exist for the service to be startable, relative to
    /// `working_dir`
    pub entry: PathBuf,
    pub working_dir: PathBuf,
    /// Optional `KEY=VALUE` file layered over the inherited environment
    pub env_file: Option<PathBuf>,
    /// Where the service's stdout and stderr go
    pub log_file: PathBuf,
    /// Repository path sent with the health probe
    pub repo_path: PathBuf,
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/agent".to_string(),
            program: "python3".to_string(),
            args: vec![
                "-m".into(),
                "uvicorn".into(),
                "agents_service:app".into(),
                "--host".into(),
                "127.0.0.1".into(),
                "--port".into(),
                "8000".into(),
            ],
            entry: PathBuf::from("agents_service.py"),
            working_dir: PathBuf::from("."),
            env_file: Some(PathBuf::from(".env")),
            log_file: std::env::temp_dir().join("codemate-sidecar.log"),
            repo_path: PathBuf::from("."),
            probe_timeout: Duration::from_millis(500),
            max_attempts: 15,
            retry_delay: Duration::from_millis(400),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl SidecarConfig {
    /// Full path of the entry point
    pub fn entry_path(&self) -> PathBuf {
        self.working_dir.join(&self.entry)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// How to start the MCP tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolServerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["mcp_server/server.py".to_string()],
            cwd: None,
            env: HashMap::new(),
        }
    }
}

/// Where persisted state lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to `<data dir>/codemate`
    pub state_dir: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Chat workflow tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Identifiers that mark a fix response as unusable
    pub known_bad_symbols: Vec<String>,
    /// Text shown while waiting for the first chunk
    pub thinking_placeholder: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            known_bad_symbols: Vec::new(),
            thinking_placeholder: "Thinking...".to_string(),
        }
    }
}
