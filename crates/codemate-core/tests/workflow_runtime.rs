//! Integration tests for the workflow runtime
//!
//! Drives a controller through UI boundary events, answering confirmations
//! and cancelling from the outside while the controller is suspended.

use async_trait::async_trait;
use codemate_core::{
    CodemateConfig, CodemateError, CodemateResult, ConfirmationBroker, InboundEvent,
    OutboundEvent, ServiceSupervisor, ToolProcessClient, WorkflowController, WorkflowRuntime,
    config::ToolServerConfig,
    confirm::PROCEED,
    events::{ChannelSink, EventSink, NoticeLevel},
    llm::{ChunkStream, ModelClient, ModelRequest},
    mcp::{McpError, ToolInvoker},
    proposal::{InMemoryDocument, InMemoryWorkspace, RequestIntent},
    session::MemoryBlobStore,
    sidecar::{AgentResult, AgentRunner, HealthProbe, ProcessHandle, SidecarLauncher},
    workflow::Collaborators,
};
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const WAIT: Duration = Duration::from_secs(5);

/// Model whose chunks are fed by the test
struct FedModel {
    chunks: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

#[async_trait]
impl ModelClient for FedModel {
    async fn stream(&self, _request: ModelRequest) -> CodemateResult<ChunkStream> {
        let rx = self
            .chunks
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CodemateError::model("stream already taken"))?;
        let chunks = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (Ok(chunk), rx))
        });
        Ok(chunks.boxed())
    }

    async fn complete(&self, _request: ModelRequest) -> CodemateResult<String> {
        Err(CodemateError::model("not scripted"))
    }
}

#[derive(Default)]
struct RecordingTools {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ToolInvoker for RecordingTools {
    async fn call_tool(&self, name: &str, _arguments: Value) -> Result<Value, McpError> {
        self.calls.lock().unwrap().push(name.to_string());
        Ok(json!({"ok": true, "message": "done"}))
    }
}

struct NoAgents;

#[async_trait]
impl AgentRunner for NoAgents {
    async fn run(&self, agent: &str, task: &str, _payload: Value) -> CodemateResult<AgentResult> {
        Err(CodemateError::other(format!("unexpected agent run {} {}", agent, task)))
    }
}

struct AlwaysHealthy;

#[async_trait]
impl HealthProbe for AlwaysHealthy {
    async fn is_healthy(&self) -> bool {
        true
    }
}

struct NeverLaunch;

impl SidecarLauncher for NeverLaunch {
    fn entry_exists(&self) -> bool {
        false
    }

    fn launch(&self) -> CodemateResult<Box<dyn ProcessHandle>> {
        Err(CodemateError::other("launch not expected"))
    }
}

struct Running {
    inbound: mpsc::UnboundedSender<InboundEvent>,
    outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    runtime: JoinHandle<CodemateResult<WorkflowController>>,
}

impl Running {
    async fn next_event(&mut self) -> OutboundEvent {
        tokio::time::timeout(WAIT, self.outbound.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("event channel closed")
    }

    /// Skip events until `pick` returns something
    async fn wait_for<T>(&mut self, mut pick: impl FnMut(&OutboundEvent) -> Option<T>) -> T {
        loop {
            let event = self.next_event().await;
            if let Some(found) = pick(&event) {
                return found;
            }
        }
    }

    fn send(&self, event: InboundEvent) {
        self.inbound.send(event).expect("runtime is running");
    }

    async fn finish(self) -> WorkflowController {
        drop(self.inbound);
        tokio::time::timeout(WAIT, self.runtime)
            .await
            .expect("runtime did not stop")
            .expect("runtime task panicked")
            .expect("runtime failed")
    }
}

async fn start(
    model: Arc<dyn ModelClient>,
    tools: Arc<dyn ToolInvoker>,
    broker_choice: Option<&str>,
) -> Running {
    let config = CodemateConfig::default();
    let (sink, outbound) = ChannelSink::channel();
    let sink: Arc<dyn EventSink> = Arc::new(sink);

    let broker = match broker_choice {
        Some(choice) => ConfirmationBroker::non_interactive(sink.clone(), Some(choice.into())),
        None => ConfirmationBroker::new(sink.clone()),
    };
    let supervisor = ServiceSupervisor::new(
        &config.sidecar,
        Arc::new(AlwaysHealthy),
        Arc::new(NeverLaunch),
        sink.clone(),
    );

    let mut workspace = InMemoryWorkspace::new();
    workspace.open(InMemoryDocument::new("src/lib.rs", "pub fn old() {}\n"));

    let mut controller = WorkflowController::new(
        Collaborators {
            blobs: Arc::new(MemoryBlobStore::new()),
            workspace: Box::new(workspace),
            model,
            tools,
            agents: Arc::new(NoAgents),
            supervisor,
            broker: Arc::new(broker),
            sink,
        },
        &config,
    );
    controller.load().await;

    let (inbound, inbound_rx) = mpsc::unbounded_channel();
    let runtime = tokio::spawn(WorkflowRuntime::run(controller, inbound_rx));
    Running {
        inbound,
        outbound,
        runtime,
    }
}

fn idle_model() -> Arc<dyn ModelClient> {
    Arc::new(FedModel {
        chunks: Mutex::new(None),
    })
}

#[tokio::test]
async fn test_confirmation_reply_reaches_suspended_controller() {
    let tools = Arc::new(RecordingTools::default());
    let mut running = start(idle_model(), tools.clone(), None).await;

    running.send(InboundEvent::RunTool {
        tool: "git_commit".to_string(),
        arguments: json!({"message": "wip"}),
    });
    let (id, choices) = running
        .wait_for(|e| match e {
            OutboundEvent::ConfirmAction { id, choices, .. } => Some((id.clone(), choices.clone())),
            _ => None,
        })
        .await;
    assert_eq!(choices, vec!["Proceed".to_string(), "Cancel".to_string()]);
    assert!(tools.calls.lock().unwrap().is_empty());

    running.send(InboundEvent::ConfirmResult {
        id,
        choice: Some(PROCEED.to_string()),
    });
    let content = running
        .wait_for(|e| match e {
            OutboundEvent::MessageAdded { message } => Some(message.content.clone()),
            _ => None,
        })
        .await;
    assert_eq!(content, "git_commit: done");

    let controller = running.finish().await;
    assert_eq!(*tools.calls.lock().unwrap(), vec!["git_commit".to_string()]);
    assert_eq!(controller.broker().pending_count(), 0);
}

#[tokio::test]
async fn test_dismissed_confirmation_skips_tool() {
    let tools = Arc::new(RecordingTools::default());
    let mut running = start(idle_model(), tools.clone(), None).await;

    running.send(InboundEvent::RunTool {
        tool: "git_push".to_string(),
        arguments: json!({}),
    });
    let id = running
        .wait_for(|e| match e {
            OutboundEvent::ConfirmAction { id, .. } => Some(id.clone()),
            _ => None,
        })
        .await;

    running.send(InboundEvent::ConfirmResult { id, choice: None });
    let notice = running
        .wait_for(|e| match e {
            OutboundEvent::Notice { level, message } => Some((*level, message.clone())),
            _ => None,
        })
        .await;
    assert_eq!(notice, (NoticeLevel::Info, "Skipped git_push".to_string()));

    running.finish().await;
    assert!(tools.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_closing_ui_declines_pending_confirmation() {
    let tools = Arc::new(RecordingTools::default());
    let mut running = start(idle_model(), tools.clone(), None).await;

    running.send(InboundEvent::RunTool {
        tool: "write_file".to_string(),
        arguments: json!({"path": "a.txt", "content": "x"}),
    });
    running
        .wait_for(|e| matches!(e, OutboundEvent::ConfirmAction { .. }).then_some(()))
        .await;

    let controller = running.finish().await;
    assert!(tools.calls.lock().unwrap().is_empty());
    assert_eq!(controller.broker().pending_count(), 0);
}

#[tokio::test]
async fn test_cancel_is_observed_after_the_next_chunk() {
    let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
    let model = Arc::new(FedModel {
        chunks: Mutex::new(Some(chunk_rx)),
    });
    let mut running = start(model, Arc::new(RecordingTools::default()), None).await;

    running.send(InboundEvent::SendMessage {
        text: "rewrite this".to_string(),
        intent: RequestIntent::Edit,
    });
    chunk_tx.send("first part".to_string()).unwrap();
    running
        .wait_for(|e| match e {
            OutboundEvent::MessageUpdated { message } if message.content == "first part" => {
                Some(())
            }
            _ => None,
        })
        .await;

    // the pending read is not aborted, nothing happens until a chunk arrives
    running.send(InboundEvent::Cancel);
    let quiet = tokio::time::timeout(Duration::from_millis(200), running.outbound.recv()).await;
    assert!(quiet.is_err(), "unexpected event: {:?}", quiet);

    chunk_tx.send("\n```rust\nfn main() {}\n```".to_string()).unwrap();
    let notice = running
        .wait_for(|e| match e {
            OutboundEvent::Notice { message, .. } => Some(message.clone()),
            _ => None,
        })
        .await;
    assert_eq!(notice, "Request cancelled");

    let controller = running.finish().await;
    let session = controller.sessions().current().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(
        session.messages[1].content,
        "first part\n```rust\nfn main() {}\n```"
    );
    assert!(session.messages[1].code_changes.is_none());
    drop(chunk_tx);
}

#[tokio::test]
async fn test_events_are_handled_in_arrival_order() {
    let mut running = start(idle_model(), Arc::new(RecordingTools::default()), Some(PROCEED)).await;

    running.send(InboundEvent::NewChat);
    running.send(InboundEvent::RunTool {
        tool: "git_status".to_string(),
        arguments: Value::Null,
    });
    running.send(InboundEvent::ClearHistory);

    let controller = running.finish().await;
    let sessions = controller.sessions().sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].messages.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_tool_call_through_spawned_server() {
    let script = r#"read init; read list; read call
printf '%s\n' 'not json'
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{}}'
printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"{\"ok\":true,\"message\":\"On branch main\"}"}]}}'"#;
    let tools = Arc::new(ToolProcessClient::new(ToolServerConfig {
        program: "sh".into(),
        args: vec!["-c".into(), script.into()],
        cwd: None,
        env: HashMap::new(),
    }));
    let mut running = start(idle_model(), tools, Some(PROCEED)).await;

    running.send(InboundEvent::RunTool {
        tool: "git_status".to_string(),
        arguments: json!({}),
    });
    let content = running
        .wait_for(|e| match e {
            OutboundEvent::MessageAdded { message } => Some(message.content.clone()),
            _ => None,
        })
        .await;
    assert_eq!(content, "git_status: On branch main");

    running.finish().await;
}
