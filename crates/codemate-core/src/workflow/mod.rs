//! Chat workflow
//!
//! [`WorkflowController`] owns the session list and every collaborator and
//! handles one inbound event at a time. [`WorkflowRuntime`] feeds it from the
//! UI while routing confirmation replies and cancellation around the queue,
//! so they take effect while the controller is suspended.

mod cancel;
mod controller;
mod prompt;
mod runtime;


pub use cancel::CancelHandle;
pub use controller::{Collaborators, WorkflowController};
pub use prompt::{DocumentSnapshot, build_request, fix_retry_request};
pub use runtime::WorkflowRuntime;
