//! User-requested cancellation

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared cancel flag, re-armed for every request.
///
/// Cancelling only flips the flag; running steps notice it at their next
/// check.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    current: Arc<Mutex<CancellationToken>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the request in progress
    pub fn cancel(&self) {
        self.current.lock().cancel();
    }

    /// Start a new request with a fresh token
    pub fn reset(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock() = token.clone();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.lock().is_cancelled()
    }
}
