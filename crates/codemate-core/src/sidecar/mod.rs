//! Agent sidecar supervision
//!
//! The sidecar is a long-lived HTTP service. [`ServiceSupervisor`] probes it,
//! starts it when it is down and polls until it answers, sharing one start
//! attempt between concurrent callers. [`AgentClient`] runs agent tasks on it.

mod client;
mod health;
mod launcher;
mod supervisor;


pub use client::{AgentClient, AgentResult, AgentRunner};
pub use health::{HealthProbe, HttpHealthProbe};
pub use launcher::{ProcessHandle, ProcessLauncher, SidecarLauncher};
pub use supervisor::{FailureReason, ServiceSupervisor, SidecarStatus};

#[cfg(test)]
pub(crate) use health::MockHealthProbe;
#[cfg(test)]
pub(crate) use launcher::MockSidecarLauncher;
