//! In-memory session list with a current session

use super::types::{Message, MessageId, PersistedState, Session, SessionId, SessionSummary};
use crate::error::{CodemateError, CodemateResult};

/// Ordered sessions plus the id of the current one.
///
/// Once any session exists the current id always points at one of them.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    current: Option<SessionId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the store from persisted state, repairing a dangling current id
    pub fn from_state(state: PersistedState) -> Self {
        let mut store = Self {
            sessions: state.sessions,
            current: state.current_session_id,
        };
        let valid = store
            .current
            .as_deref()
            .is_some_and(|id| store.sessions.iter().any(|s| s.id == id));
        if !valid {
            store.current = store.most_recent().map(|s| s.id.clone());
        }
        store
    }

    /// Snapshot for persistence
    pub fn to_state(&self) -> PersistedState {
        PersistedState {
            sessions: self.sessions.clone(),
            current_session_id: self.current.clone(),
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&Session> {
        let id = self.current.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The current session, created on first use
    pub fn ensure_current(&mut self) -> &mut Session {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => {
                self.push_new();
                self.sessions.len() - 1
            }
        };
        &mut self.sessions[idx]
    }

    /// Start a fresh session and make it current
    pub fn new_chat(&mut self) -> SessionId {
        self.push_new()
    }

    /// Make an existing session current
    pub fn switch(&mut self, id: &str) -> CodemateResult<()> {
        if !self.sessions.iter().any(|s| s.id == id) {
            return Err(CodemateError::invalid_input(format!("Unknown session {}", id)));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Drop every session and start a fresh one
    pub fn clear(&mut self) -> SessionId {
        self.sessions.clear();
        self.current = None;
        self.push_new()
    }

    /// Append a message to the current session
    pub fn append(&mut self, message: Message) -> MessageId {
        let id = message.id.clone();
        self.ensure_current().add_message(message);
        id
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.sessions.iter().find_map(|s| s.message(id))
    }

    /// Mutate a message in place and bump its session's timestamp
    pub fn update_message<F>(&mut self, id: &str, update: F) -> CodemateResult<&Message>
    where
        F: FnOnce(&mut Message),
    {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.message(id).is_some())
            .ok_or_else(|| CodemateError::not_found_resource(id, "message"))?;
        session.touch();
        let message = session
            .message_mut(id)
            .ok_or_else(|| CodemateError::not_found_resource(id, "message"))?;
        update(message);
        Ok(message)
    }

    /// Summaries sorted by most recent update first
    pub fn summaries(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> =
            self.sessions.iter().map(SessionSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    fn push_new(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.push(session);
        self.current = Some(id.clone());
        id
    }

    fn current_index(&self) -> Option<usize> {
        let id = self.current.as_deref()?;
        self.sessions.iter().position(|s| s.id == id)
    }

    fn most_recent(&self) -> Option<&Session> {
        self.sessions.iter().max_by_key(|s| s.updated_at)
    }
}
