//! Pending confirmation table

use crate::events::{EventSink, OutboundEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Choice that lets a guarded action run
pub const PROCEED: &str = "Proceed";

/// Choice that skips a guarded action
pub const CANCEL: &str = "Cancel";

type Resolver = oneshot::Sender<Option<String>>;

/// Correlates confirmation requests with their replies
pub struct ConfirmationBroker {
    pending: Mutex<HashMap<String, Resolver>>,
    sink: Arc<dyn EventSink>,
    auto_choice: Option<String>,
    closed: AtomicBool,
}

impl ConfirmationBroker {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            sink,
            auto_choice: None,
            closed: AtomicBool::new(false),
        }
    }

    /// A broker that answers every request with `choice` without asking
    pub fn non_interactive(sink: Arc<dyn EventSink>, choice: Option<String>) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            sink,
            auto_choice: Some(choice.unwrap_or_default()),
            closed: AtomicBool::new(false),
        }
    }

    /// Ask the user and wait for the answer.
    ///
    /// Returns `None` when the user dismissed the prompt or the broker was
    /// closed before a reply arrived.
    pub async fn ask(&self, title: &str, detail: &str, choices: &[&str]) -> Option<String> {
        if let Some(choice) = &self.auto_choice {
            debug!(title, choice = %choice, "auto-answered confirmation");
            return (!choice.is_empty()).then(|| choice.clone());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if self.closed.load(Ordering::Acquire) {
                debug!(title, "broker closed, confirmation declined");
                return None;
            }
            pending.insert(id.clone(), tx);
        }
        let _guard = PendingGuard {
            broker: self,
            id: id.clone(),
        };

        self.sink.emit(OutboundEvent::ConfirmAction {
            id: id.clone(),
            title: title.to_string(),
            detail: detail.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        });
        debug!(request_id = %id, title, "waiting for confirmation");

        let choice = rx.await.unwrap_or(None);
        info!(request_id = %id, choice = ?choice, "confirmation resolved");
        choice
    }

    /// Deliver a reply. Returns false when no request with `id` is pending.
    pub fn resolve(&self, id: &str, choice: Option<String>) -> bool {
        let Some(tx) = self.pending.lock().remove(id) else {
            debug!(request_id = %id, "reply for unknown confirmation ignored");
            return false;
        };
        // The asker may have gone away; nothing to do then
        let _ = tx.send(choice);
        true
    }

    /// Number of requests still waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Release every waiting caller with `None`; later requests resolve to
    /// `None` immediately
    pub fn close(&self) {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            self.closed.store(true, Ordering::Release);
            pending.drain().collect()
        };
        if !drained.is_empty() {
            info!(count = drained.len(), "closing pending confirmations");
        }
    }
}

/// Removes the table entry if the asking future is dropped before a reply
struct PendingGuard<'a> {
    broker: &'a ConfirmationBroker,
    id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.broker.pending.lock().remove(&self.id);
    }
}
