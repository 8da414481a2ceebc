//! Per-session traversal state.
//!
//! The graph is shared and immutable; everything a traversal changes lives
//! here: the current page, the free-text history and content overrides
//! written by callbacks. Nothing in a `SessionContext` is visible to other
//! sessions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::events::SessionEvent;
use crate::types::{PageId, UserId};

/// Navigator state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Displaying,
    AwaitingInput,
    Resolving,
    Terminated,
}

#[derive(Debug)]
pub struct SessionContext {
    session_id: Uuid,
    user: UserId,
    current_page: PageId,
    state: SessionState,
    input_history: Vec<String>,
    content_overrides: HashMap<PageId, String>,
    events: Vec<SessionEvent>,
}

impl SessionContext {
    pub fn new(user: UserId, entry: PageId) -> Self {
        let session_id = Uuid::now_v7();
        Self {
            events: vec![SessionEvent::Started {
                session_id,
                user: user.clone(),
            }],
            session_id,
            user,
            current_page: entry,
            state: SessionState::Displaying,
            input_history: Vec::new(),
            content_overrides: HashMap::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn current_page(&self) -> PageId {
        self.current_page
    }

    pub(crate) fn set_current_page(&mut self, page: PageId) {
        self.current_page = page;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn input_history(&self) -> &[String] {
        &self.input_history
    }

    /// Append a free-text input and return its position.
    pub fn push_input(&mut self, text: String) -> usize {
        self.input_history.push(text);
        self.input_history.len() - 1
    }

    pub fn content_override(&self, page: PageId) -> Option<&str> {
        self.content_overrides.get(&page).map(String::as_str)
    }

    pub fn override_content(&mut self, page: PageId, text: String) {
        self.content_overrides.insert(page, text);
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub(crate) fn record(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn into_report(self) -> SessionReport {
        SessionReport {
            session_id: self.session_id,
            user: self.user,
            final_page: self.current_page,
            input_history: self.input_history,
            events: self.events,
        }
    }
}

/// What remains of a session once it terminated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub user: UserId,
    /// Page displayed when the user left.
    pub final_page: PageId,
    pub input_history: Vec<String>,
    pub events: Vec<SessionEvent>,
}

impl SessionReport {
    /// Pages in the order they were displayed.
    pub fn displayed_pages(&self) -> Vec<PageId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Displayed { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }
}
