use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::schema::{PrincipalId, RecordId};

/// Where a principal currently is in the input flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingCategory,
    AwaitingItemText,
    AwaitingEditText,
}

/// Ephemeral per-principal conversation state.
///
/// Sessions are not persisted across restarts; they are re-derivable by
/// re-prompting the user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: SessionState,
    pub blank_type: Option<String>,
    pub category: Option<String>,
    pub edit_target: Option<RecordId>,
}

impl Session {
    pub fn select_blank(&mut self, blank_type: &str) {
        self.state = SessionState::AwaitingCategory;
        self.blank_type = Some(blank_type.to_string());
    }

    /// Remembers the chosen category and clears any pending edit target.
    pub fn select_category(&mut self, category: &str) {
        self.state = SessionState::AwaitingItemText;
        self.category = Some(category.to_string());
        self.edit_target = None;
    }

    pub fn begin_edit(&mut self, record_id: RecordId) {
        self.state = SessionState::AwaitingEditText;
        self.edit_target = Some(record_id);
    }

    /// Back to `Idle`, discarding in-progress selections.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

/// Process-local map of sessions, safe to share across the transport's
/// worker tasks. Per-principal serialization of transitions is the
/// transport's responsibility.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<PrincipalId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the principal's session, creating an idle one on first
    /// interaction.
    pub fn snapshot(&self, principal: PrincipalId) -> Session {
        self.lock().entry(principal).or_default().clone()
    }

    pub fn update<F>(&self, principal: PrincipalId, apply: F)
    where
        F: FnOnce(&mut Session),
    {
        apply(self.lock().entry(principal).or_default());
    }

    pub fn reset(&self, principal: PrincipalId) {
        self.update(principal, Session::reset);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PrincipalId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
