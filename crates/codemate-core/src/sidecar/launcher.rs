//! Starting the sidecar process

use crate::config::SidecarConfig;
use crate::error::{CodemateError, CodemateResult};
use std::fs::OpenOptions;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// A started sidecar process
pub trait ProcessHandle: Send {
    fn id(&self) -> u32;

    /// Send the kill signal without waiting for the process to exit
    fn kill(&mut self) -> std::io::Result<()>;

    /// Block until a killed process has exited
    fn reap(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ProcessHandle for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn kill(&mut self) -> std::io::Result<()> {
        Child::kill(self)
    }

    fn reap(&mut self) -> std::io::Result<()> {
        self.wait().map(|_| ())
    }
}

/// Reap a killed process on the blocking pool so no zombie is left behind
pub(crate) fn reap_in_background(mut handle: Box<dyn ProcessHandle>) {
    let mut reap = move || {
        let pid = handle.id();
        if let Err(e) = handle.reap() {
            debug!(pid, error = %e, "failed to reap sidecar");
        }
    };
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn_blocking(reap);
        }
        Err(_) => reap(),
    }
}

/// Knows how to find and start the sidecar
#[cfg_attr(test, mockall::automock)]
pub trait SidecarLauncher: Send + Sync {
    /// Whether the entry point is present
    fn entry_exists(&self) -> bool;

    /// Start the sidecar without waiting for it to become healthy
    fn launch(&self) -> CodemateResult<Box<dyn ProcessHandle>>;
}

/// Spawns the configured program, detached, with output sent to a log file
pub struct ProcessLauncher {
    config: SidecarConfig,
}

impl ProcessLauncher {
    pub fn new(config: SidecarConfig) -> Self {
        Self { config }
    }

    /// `KEY=VALUE` pairs from the configured env file; unreadable entries
    /// are skipped
    fn env_overrides(&self) -> Vec<(String, String)> {
        let Some(file) = &self.config.env_file else {
            return Vec::new();
        };
        let path = if file.is_absolute() {
            file.clone()
        } else {
            self.config.working_dir.join(file)
        };

        match dotenvy::from_path_iter(&path) {
            Ok(iter) => iter
                .filter_map(|item| match item {
                    Ok(pair) => Some(pair),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping env file entry");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no env overrides loaded");
                Vec::new()
            }
        }
    }
}

impl SidecarLauncher for ProcessLauncher {
    fn entry_exists(&self) -> bool {
        self.config.entry_path().exists()
    }

    fn launch(&self) -> CodemateResult<Box<dyn ProcessHandle>> {
        let log_path = &self.config.log_file;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| {
                CodemateError::io_with_path(
                    format!("Failed to open sidecar log: {}", e),
                    log_path.display().to_string(),
                )
            })?;
        let log_err = log.try_clone()?;

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .current_dir(&self.config.working_dir)
            .envs(self.env_overrides())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // own process group so the sidecar outlives the editor session
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|e| {
            CodemateError::transport_with_context(
                format!("Failed to start sidecar '{}': {}", self.config.program, e),
                self.config.working_dir.display().to_string(),
            )
        })?;
        debug!(pid = child.id(), log = %log_path.display(), "sidecar spawned");
        Ok(Box::new(child))
    }
}
