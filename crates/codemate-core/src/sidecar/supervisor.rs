//! Start-once supervision of the sidecar

use super::health::HealthProbe;
use super::launcher::{ProcessHandle, SidecarLauncher, reap_in_background};
use crate::config::SidecarConfig;
use crate::events::{AgentStatus, EventSink, OutboundEvent};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why the sidecar could not be brought up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The entry point does not exist
    Missing,
    /// Started but never answered the probe
    Timeout,
    /// The process could not be spawned
    StartFailed,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Timeout => "timeout",
            Self::StartFailed => "start_failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last reported sidecar state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarStatus {
    Unknown,
    Starting,
    Ready,
    Error(FailureReason),
}

type StartFuture = Shared<BoxFuture<'static, bool>>;

struct Inner {
    probe: Arc<dyn HealthProbe>,
    launcher: Arc<dyn SidecarLauncher>,
    sink: Arc<dyn EventSink>,
    max_attempts: u32,
    retry_delay: Duration,
    status: Mutex<SidecarStatus>,
    in_flight: Mutex<Option<(u64, StartFuture)>>,
    generation: AtomicU64,
    process: Mutex<Option<Box<dyn ProcessHandle>>>,
}

/// Keeps the sidecar running.
///
/// The supervisor owns the handle of the process it spawned, at most one at
/// a time. Dropping the supervisor leaves that process running so it can be
/// reused by the next session; call [`ServiceSupervisor::shutdown`] to stop
/// it explicitly.
#[derive(Clone)]
pub struct ServiceSupervisor {
    inner: Arc<Inner>,
}

impl ServiceSupervisor {
    pub fn new(
        config: &SidecarConfig,
        probe: Arc<dyn HealthProbe>,
        launcher: Arc<dyn SidecarLauncher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                probe,
                launcher,
                sink,
                max_attempts: config.max_attempts,
                retry_delay: config.retry_delay,
                status: Mutex::new(SidecarStatus::Unknown),
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
                process: Mutex::new(None),
            }),
        }
    }

    /// Make sure the sidecar answers its health probe, starting it if needed.
    ///
    /// Concurrent callers share a single probe-and-start operation, so at
    /// most one process is spawned per attempt.
    pub async fn ensure_running(&self) -> bool {
        let operation = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some((_, shared)) => {
                    debug!("joining in-flight sidecar start");
                    shared.clone()
                }
                None => {
                    let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    let inner = self.inner.clone();
                    let shared = async move {
                        let ok = inner.probe_and_start().await;
                        inner.finish(generation);
                        ok
                    }
                    .boxed()
                    .shared();
                    *slot = Some((generation, shared.clone()));
                    shared
                }
            }
        };
        operation.await
    }

    /// Last reported status
    pub fn status(&self) -> SidecarStatus {
        *self.inner.status.lock()
    }

    /// Kill the process this supervisor spawned, if any.
    ///
    /// Returns true when a process was stopped.
    pub fn shutdown(&self) -> bool {
        let Some(mut handle) = self.inner.process.lock().take() else {
            return false;
        };
        let pid = handle.id();
        match handle.kill() {
            Ok(()) => {
                reap_in_background(handle);
                info!(pid, "sidecar stopped");
                self.inner.report(SidecarStatus::Unknown);
                true
            }
            Err(e) => {
                warn!(pid, error = %e, "failed to stop sidecar");
                false
            }
        }
    }

    /// Whether this supervisor holds a spawned process
    pub fn owns_process(&self) -> bool {
        self.inner.process.lock().is_some()
    }
}

impl Inner {
    async fn probe_and_start(&self) -> bool {
        if self.probe.is_healthy().await {
            self.report(SidecarStatus::Ready);
            return true;
        }

        self.report(SidecarStatus::Starting);
        if !self.launcher.entry_exists() {
            warn!("sidecar entry point not found");
            self.report(SidecarStatus::Error(FailureReason::Missing));
            return false;
        }

        match self.launcher.launch() {
            Ok(handle) => {
                info!(pid = handle.id(), "sidecar launched");
                let previous = self.process.lock().replace(handle);
                if let Some(mut old) = previous {
                    // the old one stopped answering; only one may be alive
                    match old.kill() {
                        Ok(()) => reap_in_background(old),
                        Err(e) => {
                            debug!(pid = old.id(), error = %e, "previous sidecar already gone")
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to launch sidecar");
                self.report(SidecarStatus::Error(FailureReason::StartFailed));
                return false;
            }
        }

        for attempt in 1..=self.max_attempts {
            if self.probe.is_healthy().await {
                info!(attempt, "sidecar ready");
                self.report(SidecarStatus::Ready);
                return true;
            }
            debug!(attempt, max_attempts = self.max_attempts, "sidecar not ready yet");
            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        warn!(attempts = self.max_attempts, "sidecar did not become ready");
        self.report(SidecarStatus::Error(FailureReason::Timeout));
        false
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
            *slot = None;
        }
    }

    fn report(&self, status: SidecarStatus) {
        {
            let mut current = self.status.lock();
            if *current == status {
                return;
            }
            *current = status;
        }
        info!(status = ?status, "sidecar status changed");

        let (status, detail) = match status {
            SidecarStatus::Unknown => (AgentStatus::Unknown, None),
            SidecarStatus::Starting => (AgentStatus::Starting, None),
            SidecarStatus::Ready => (AgentStatus::Ready, None),
            SidecarStatus::Error(reason) => (AgentStatus::Error, Some(reason.to_string())),
        };
        self.sink.emit(OutboundEvent::AgentStatus { status, detail });
    }
}
