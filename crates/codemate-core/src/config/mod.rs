//! Configuration
//!
//! Settings come from a TOML file (`codemate.toml` by default), then from
//! `CODEMATE_*` environment variables. A missing file yields defaults.

mod loader;
mod model;

pub use loader::{DEFAULT_CONFIG_FILE, apply_env_overrides, load_config, parse_config};
pub use model::{
    CodemateConfig, LogFormat, LoggingConfig, SidecarConfig, StorageConfig, ToolServerConfig,
    WorkflowConfig,
};
