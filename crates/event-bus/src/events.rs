use chrono::{DateTime, Utc};
use resilience_core_types::{ActionId, ActionKind, Locator};
use serde::Serialize;

/// Phase of an action an event reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionEventKind {
    Before,
    After,
    Error,
}

impl ActionEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionEventKind::Before => "action.before",
            ActionEventKind::After => "action.after",
            ActionEventKind::Error => "action.error",
        }
    }
}

/// Structured notification emitted around every `perform()`
#[derive(Debug, Clone, Serialize)]
pub struct ActionEvent {
    pub kind: ActionEventKind,
    pub action_id: ActionId,
    pub action: ActionKind,
    pub locator: Locator,
    pub timestamp: DateTime<Utc>,
    /// Set on `After` and `Error`
    pub elapsed_ms: Option<u64>,
    /// Set on `Error`
    pub error: Option<String>,
}

impl ActionEvent {
    pub fn before(action_id: ActionId, action: ActionKind, locator: Locator) -> Self {
        Self {
            kind: ActionEventKind::Before,
            action_id,
            action,
            locator,
            timestamp: Utc::now(),
            elapsed_ms: None,
            error: None,
        }
    }

    pub fn after(action_id: ActionId, action: ActionKind, locator: Locator, elapsed_ms: u64) -> Self {
        Self {
            kind: ActionEventKind::After,
            elapsed_ms: Some(elapsed_ms),
            ..Self::before(action_id, action, locator)
        }
    }

    pub fn error(
        action_id: ActionId,
        action: ActionKind,
        locator: Locator,
        elapsed_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionEventKind::Error,
            elapsed_ms: Some(elapsed_ms),
            error: Some(error.into()),
            ..Self::before(action_id, action, locator)
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
