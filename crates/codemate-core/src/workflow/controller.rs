//! Event dispatch over the owned workflow state

use super::cancel::CancelHandle;
use super::prompt::{DocumentSnapshot, build_request, fix_retry_request};
use crate::config::{CodemateConfig, WorkflowConfig};
use crate::confirm::{CANCEL, ConfirmationBroker, PROCEED};
use crate::error::{CodemateError, CodemateResult, OptionExt};
use crate::events::{EventSink, InboundEvent, NoticeLevel, OutboundEvent};
use crate::llm::ModelClient;
use crate::mcp::{ToolInvoker, ToolOutcome, find_tool};
use crate::proposal::{
    ApplyOutcome, RequestIntent, Workspace, apply_change, extract_code_block, propose_change,
    reject_change,
};
use crate::session::{BlobStore, FileContext, Message, SessionStore};
use crate::sidecar::{AgentRunner, ServiceSupervisor};
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Everything the controller talks to
pub struct Collaborators {
    pub blobs: Arc<dyn BlobStore>,
    pub workspace: Box<dyn Workspace>,
    pub model: Arc<dyn ModelClient>,
    pub tools: Arc<dyn ToolInvoker>,
    pub agents: Arc<dyn AgentRunner>,
    pub supervisor: ServiceSupervisor,
    pub broker: Arc<ConfirmationBroker>,
    pub sink: Arc<dyn EventSink>,
}

/// Owns the session list and drives one request at a time
pub struct WorkflowController {
    sessions: SessionStore,
    blobs: Arc<dyn BlobStore>,
    workspace: Box<dyn Workspace>,
    model: Arc<dyn ModelClient>,
    tools: Arc<dyn ToolInvoker>,
    agents: Arc<dyn AgentRunner>,
    supervisor: ServiceSupervisor,
    broker: Arc<ConfirmationBroker>,
    sink: Arc<dyn EventSink>,
    cancel: CancelHandle,
    settings: WorkflowConfig,
    repo_path: PathBuf,
}

impl WorkflowController {
    pub fn new(parts: Collaborators, config: &CodemateConfig) -> Self {
        Self {
            sessions: SessionStore::new(),
            blobs: parts.blobs,
            workspace: parts.workspace,
            model: parts.model,
            tools: parts.tools,
            agents: parts.agents,
            supervisor: parts.supervisor,
            broker: parts.broker,
            sink: parts.sink,
            cancel: CancelHandle::new(),
            settings: config.workflow.clone(),
            repo_path: config.sidecar.repo_path.clone(),
        }
    }

    /// Restore persisted sessions and publish the session list
    pub async fn load(&mut self) {
        match self.blobs.load_state().await {
            Ok(Some(state)) => {
                self.sessions = SessionStore::from_state(state);
                info!(sessions = self.sessions.sessions().len(), "restored sessions");
            }
            Ok(None) => debug!("no persisted sessions"),
            Err(e) => warn!(error = %e, "failed to load sessions, starting empty"),
        }
        self.sessions.ensure_current();
        self.emit_session_list();
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn workspace(&self) -> &dyn Workspace {
        self.workspace.as_ref()
    }

    pub fn workspace_mut(&mut self) -> &mut dyn Workspace {
        self.workspace.as_mut()
    }

    pub fn broker(&self) -> Arc<ConfirmationBroker> {
        self.broker.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Handle one inbound event. Failures become notices.
    pub async fn handle(&mut self, event: InboundEvent) {
        let result = match event {
            InboundEvent::SendMessage { text, intent } => self.send_message(&text, intent).await,
            InboundEvent::ApplyChange {
                message_id,
                change_index,
            } => self.apply(&message_id, change_index).await,
            InboundEvent::RejectChange {
                message_id,
                change_index,
            } => self.reject(&message_id, change_index).await,
            InboundEvent::ConfirmResult { id, choice } => {
                self.broker.resolve(&id, choice);
                Ok(())
            }
            InboundEvent::RunTool { tool, arguments } => self.run_tool(&tool, arguments).await,
            InboundEvent::RunAgent {
                agent,
                task,
                payload,
            } => self.run_agent(&agent, &task, payload).await,
            InboundEvent::NewChat => {
                self.sessions.new_chat();
                self.after_session_change().await;
                Ok(())
            }
            InboundEvent::SwitchSession { session_id } => {
                let switched = self.sessions.switch(&session_id);
                if switched.is_ok() {
                    self.after_session_change().await;
                }
                switched
            }
            InboundEvent::ClearHistory => {
                self.sessions.clear();
                self.after_session_change().await;
                Ok(())
            }
            InboundEvent::Cancel => {
                self.cancel.cancel();
                Ok(())
            }
        };

        if let Err(e) = result {
            self.report_error(&e);
        }
    }

    /// Run a chat request and attach a proposal when the reply has code
    #[instrument(skip(self, text))]
    pub async fn send_message(&mut self, text: &str, intent: RequestIntent) -> CodemateResult<()> {
        let snapshot = self.snapshot();
        if intent.replaces_document() && snapshot.is_none() {
            return Err(CodemateError::invalid_input(
                "Open a file to edit or fix it first",
            ));
        }

        let mut user = Message::user(text);
        if let Some(doc) = self.workspace.active_document() {
            user = user.with_file_context(FileContext {
                file: doc.path().display().to_string(),
                language: doc.language().map(str::to_string),
                selection: doc.selection(),
            });
        }
        self.sessions.append(user.clone());
        self.sink.emit(OutboundEvent::MessageAdded { message: user });
        self.emit_session_list();

        let assistant = Message::assistant("").with_thinking(&self.settings.thinking_placeholder);
        let assistant_id = self.sessions.append(assistant.clone());
        self.sink.emit(OutboundEvent::MessageAdded { message: assistant });
        self.persist().await;

        let token = self.cancel.reset();
        let request = build_request(text, intent, snapshot.as_ref());
        let mut stream = match self.model.stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_reply(&assistant_id, &e).await?;
                return Err(e);
            }
        };

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.fail_reply(&assistant_id, &e).await?;
                    return Err(e);
                }
            };
            let message = self.sessions.update_message(&assistant_id, |m| {
                m.thinking = None;
                m.content.push_str(&chunk);
            })?;
            self.sink.emit(OutboundEvent::MessageUpdated {
                message: message.clone(),
            });
            if token.is_cancelled() {
                break;
            }
        }
        drop(stream);

        if token.is_cancelled() {
            info!("request cancelled");
            let message = self.sessions.update_message(&assistant_id, |m| m.thinking = None)?;
            self.sink.emit(OutboundEvent::MessageUpdated {
                message: message.clone(),
            });
            self.sink
                .emit(OutboundEvent::notice(NoticeLevel::Info, "Request cancelled"));
            self.persist().await;
            return Ok(());
        }

        let mut reply = self
            .sessions
            .message(&assistant_id)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if intent.is_fix() && self.needs_regeneration(&reply) {
            info!("fix reply unusable, regenerating once");
            let retry = fix_retry_request(text, snapshot.as_ref(), &self.settings.known_bad_symbols);
            match self.model.complete(retry).await {
                Ok(regenerated)
                    if !token.is_cancelled() && extract_code_block(&regenerated).is_some() =>
                {
                    reply = regenerated;
                }
                Ok(_) => debug!("regenerated fix discarded"),
                Err(e) => warn!(error = %e, "fix regeneration failed"),
            }
        }

        let change = match (extract_code_block(&reply), self.workspace.active_document()) {
            (Some(block), Some(doc)) => Some(propose_change(doc, &block.code, intent)),
            (Some(_), None) => {
                debug!("code block without an open document, no proposal");
                None
            }
            (None, _) => None,
        };

        let message = self.sessions.update_message(&assistant_id, |m| {
            m.thinking = None;
            m.content = reply;
            m.code_changes = change.map(|c| vec![c]);
        })?;
        self.sink.emit(OutboundEvent::MessageUpdated {
            message: message.clone(),
        });
        self.persist().await;
        Ok(())
    }

    /// Apply one proposal of a message to its document
    pub async fn apply(&mut self, message_id: &str, index: usize) -> CodemateResult<()> {
        let mut change = self
            .sessions
            .message(message_id)
            .or_not_found(format!("message {}", message_id))?
            .code_changes
            .as_ref()
            .and_then(|changes| changes.get(index))
            .cloned()
            .or_not_found(format!("change {} of message {}", index, message_id))?;

        match apply_change(self.workspace.as_mut(), &mut change).await? {
            ApplyOutcome::AlreadyApplied => {
                self.sink.emit(OutboundEvent::notice(
                    NoticeLevel::Info,
                    "Change was already applied",
                ));
                return Ok(());
            }
            ApplyOutcome::Applied => {}
        }

        let message = self.sessions.update_message(message_id, |m| {
            if let Some(slot) = m.change_mut(index) {
                *slot = change;
            }
        })?;
        self.sink.emit(OutboundEvent::MessageUpdated {
            message: message.clone(),
        });
        self.persist().await;
        Ok(())
    }

    /// Drop one proposal from a message
    pub async fn reject(&mut self, message_id: &str, index: usize) -> CodemateResult<()> {
        let mut changes = self
            .sessions
            .message(message_id)
            .or_not_found(format!("message {}", message_id))?
            .code_changes
            .clone()
            .or_not_found(format!("change {}", index))?;
        reject_change(&mut changes, index)?;

        let message = self.sessions.update_message(message_id, |m| {
            m.code_changes = (!changes.is_empty()).then_some(changes);
        })?;
        self.sink.emit(OutboundEvent::MessageUpdated {
            message: message.clone(),
        });
        self.persist().await;
        Ok(())
    }

    /// Run a tool after the user confirms it
    #[instrument(skip(self, arguments))]
    pub async fn run_tool(&mut self, tool: &str, arguments: Value) -> CodemateResult<()> {
        let spec = find_tool(tool)
            .ok_or_else(|| CodemateError::invalid_input(format!("Unknown tool {}", tool)))?;
        let arguments = if tool.starts_with("git_") {
            self.with_repo_path(arguments)
        } else {
            arguments
        };

        let detail = format!(
            "{}\n{}\n\n{}",
            spec.description,
            spec.risk.description(),
            serde_json::to_string_pretty(&arguments)?
        );
        let choice = self
            .broker
            .ask(&format!("Run {}?", tool), &detail, &[PROCEED, CANCEL])
            .await;
        if choice.as_deref() != Some(PROCEED) {
            info!(tool, choice = ?choice, "tool call skipped");
            self.sink.emit(OutboundEvent::notice(
                NoticeLevel::Info,
                format!("Skipped {}", tool),
            ));
            return Ok(());
        }

        let value = self.tools.call_tool(tool, arguments).await?;
        let outcome = ToolOutcome::from_value(value);
        let level = if outcome.ok {
            NoticeLevel::Info
        } else {
            NoticeLevel::Error
        };

        let message = Message::assistant(format!("{}: {}", tool, outcome.summary()));
        self.sessions.append(message.clone());
        self.sink.emit(OutboundEvent::MessageAdded { message });
        self.sink.emit(OutboundEvent::notice(level, outcome.summary()));
        self.persist().await;
        Ok(())
    }

    /// Run an agent task on the sidecar, starting it if needed
    #[instrument(skip(self, payload))]
    pub async fn run_agent(&mut self, agent: &str, task: &str, payload: Value) -> CodemateResult<()> {
        let payload = self.with_repo_path(payload);
        let choice = self
            .broker
            .ask(
                &format!("Run {} / {}?", agent, task),
                &serde_json::to_string_pretty(&payload)?,
                &[PROCEED, CANCEL],
            )
            .await;
        if choice.as_deref() != Some(PROCEED) {
            info!(agent, task, "agent task skipped");
            self.sink.emit(OutboundEvent::notice(
                NoticeLevel::Info,
                format!("Skipped {}", task),
            ));
            return Ok(());
        }

        if !self.supervisor.ensure_running().await {
            return Err(CodemateError::transport(format!(
                "Agent service is not available ({:?})",
                self.supervisor.status()
            )));
        }

        let result = self.agents.run(agent, task, payload).await?;
        let level = if result.is_success() {
            NoticeLevel::Info
        } else {
            NoticeLevel::Error
        };
        let summary = match &result.error {
            Some(err) => format!("{} {}: {} ({})", agent, task, result.status, err),
            None => format!("{} {}: {} {}", agent, task, result.status, result.details),
        };

        let message = Message::assistant(summary.trim_end().to_string());
        self.sessions.append(message.clone());
        self.sink.emit(OutboundEvent::MessageAdded { message });
        self.sink.emit(OutboundEvent::notice(level, result.details));
        self.persist().await;
        Ok(())
    }

    fn snapshot(&self) -> Option<DocumentSnapshot> {
        let doc = self.workspace.active_document()?;
        let selection = doc.selection();
        Some(DocumentSnapshot {
            file: doc.path().display().to_string(),
            language: doc.language().map(str::to_string),
            code: doc.text(selection),
            is_selection: selection.is_some(),
        })
    }

    fn needs_regeneration(&self, reply: &str) -> bool {
        match extract_code_block(reply) {
            None => true,
            Some(block) => self
                .settings
                .known_bad_symbols
                .iter()
                .any(|symbol| block.code.contains(symbol.as_str())),
        }
    }

    /// Fill in the configured repository when the caller left it out
    fn with_repo_path(&self, arguments: Value) -> Value {
        let mut arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        if let Some(map) = arguments.as_object_mut() {
            map.entry("repo_path")
                .or_insert_with(|| Value::String(self.repo_path.display().to_string()));
        }
        arguments
    }

    async fn fail_reply(&mut self, message_id: &str, err: &CodemateError) -> CodemateResult<()> {
        let message = self.sessions.update_message(message_id, |m| {
            m.thinking = None;
            if m.content.is_empty() {
                m.content = format!("Error: {}", err.user_message());
            }
        })?;
        self.sink.emit(OutboundEvent::MessageUpdated {
            message: message.clone(),
        });
        self.persist().await;
        Ok(())
    }

    async fn after_session_change(&mut self) {
        self.emit_session_list();
        self.persist().await;
    }

    fn emit_session_list(&self) {
        self.sink.emit(OutboundEvent::SessionList {
            sessions: self.sessions.summaries(),
            current_session_id: self.sessions.current_id().map(str::to_string),
        });
    }

    async fn persist(&self) {
        if let Err(e) = self.blobs.save_state(&self.sessions.to_state()).await {
            warn!(error = %e, "failed to persist sessions");
        }
    }

    fn report_error(&self, err: &CodemateError) {
        match err {
            CodemateError::NotFound { .. } => warn!(error = %err, "stale reference"),
            CodemateError::InvalidInput { .. } => info!(error = %err, "request rejected"),
            _ => error!(code = err.error_code(), error = %err, "request failed"),
        }
        let level = match err {
            CodemateError::InvalidInput { .. } => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        self.sink
            .emit(OutboundEvent::notice(level, err.user_message()));
    }
}
