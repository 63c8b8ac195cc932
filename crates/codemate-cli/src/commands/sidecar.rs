//! Sidecar commands

use crate::console::CliConsole;
use codemate_core::sidecar::{
    HealthProbe, HttpHealthProbe, ProcessLauncher, ServiceSupervisor, SidecarStatus,
};
use codemate_core::{CodemateConfig, CodemateError, CodemateResult};
use std::sync::Arc;

/// Supervisor reporting its status changes on the console
pub(crate) fn supervisor(console: &CliConsole, config: &CodemateConfig) -> ServiceSupervisor {
    ServiceSupervisor::new(
        &config.sidecar,
        Arc::new(HttpHealthProbe::new(&config.sidecar)),
        Arc::new(ProcessLauncher::new(config.sidecar.clone())),
        Arc::new(*console),
    )
}

/// Probe the sidecar once without starting it
pub async fn status(console: &CliConsole, config: &CodemateConfig) -> CodemateResult<()> {
    let probe = HttpHealthProbe::new(&config.sidecar);
    if probe.is_healthy().await {
        console.success(&format!("Agent service is up at {}", config.sidecar.base_url));
    } else {
        console.warn(&format!(
            "Agent service is not answering at {}",
            config.sidecar.base_url
        ));
    }
    Ok(())
}

/// Start the sidecar if needed and wait until it answers.
///
/// The started process keeps running after this command exits.
pub async fn start(console: &CliConsole, config: &CodemateConfig) -> CodemateResult<()> {
    let supervisor = supervisor(console, config);
    if supervisor.ensure_running().await {
        if supervisor.owns_process() {
            console.info(&format!(
                "Output goes to {}",
                config.sidecar.log_file.display()
            ));
        }
        return Ok(());
    }

    match supervisor.status() {
        SidecarStatus::Error(reason) => Err(CodemateError::transport_with_context(
            format!("Agent service could not be started: {}", reason),
            config.sidecar.entry_path().display().to_string(),
        )),
        other => Err(CodemateError::transport(format!(
            "Agent service is not available ({:?})",
            other
        ))),
    }
}
