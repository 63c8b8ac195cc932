//! Inbound event loop

use super::controller::WorkflowController;
use crate::error::{CodemateError, CodemateResult};
use crate::events::InboundEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drives a [`WorkflowController`] from a stream of UI events.
///
/// Confirmation replies and cancellation bypass the queue; everything else is
/// handled by the controller in arrival order.
pub struct WorkflowRuntime;

impl WorkflowRuntime {
    /// Run until `inbound` closes, then hand the controller back.
    ///
    /// Outstanding confirmations resolve as dismissed once the UI is gone.
    pub async fn run(
        controller: WorkflowController,
        mut inbound: mpsc::UnboundedReceiver<InboundEvent>,
    ) -> CodemateResult<WorkflowController> {
        let broker = controller.broker();
        let cancel = controller.cancel_handle();
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<InboundEvent>();

        let worker = tokio::spawn(async move {
            let mut controller = controller;
            while let Some(event) = queue_rx.recv().await {
                controller.handle(event).await;
            }
            controller
        });

        while let Some(event) = inbound.recv().await {
            match event {
                InboundEvent::ConfirmResult { id, choice } => {
                    if !broker.resolve(&id, choice) {
                        debug!(request_id = %id, "confirmation reply had no waiter");
                    }
                }
                InboundEvent::Cancel => {
                    info!("cancel requested");
                    cancel.cancel();
                }
                other => {
                    if queue_tx.send(other).is_err() {
                        warn!("workflow worker stopped, dropping remaining events");
                        break;
                    }
                }
            }
        }

        drop(queue_tx);
        broker.close();
        worker
            .await
            .map_err(|e| CodemateError::other(format!("workflow worker failed: {}", e)))
    }
}
