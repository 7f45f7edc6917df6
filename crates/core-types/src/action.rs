//! Action descriptors passed through the pipeline

use crate::locator::ElementHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one `perform()` invocation, used for log correlation
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The UI actions the pipeline knows how to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Resolve the element and hand back its handle
    Locate,

    /// Tap the element
    Click,

    /// Clear the element, then type `ActionArgs::text`
    TypeText,

    /// Read the element's visible text
    ReadText,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Locate => "locate",
            ActionKind::Click => "click",
            ActionKind::TypeText => "type_text",
            ActionKind::ReadText => "read_text",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments for an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionArgs {
    /// Text to type (only used by `TypeText`)
    pub text: Option<String>,
}

impl ActionArgs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Result of a performed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutput {
    /// Handle of the resolved (and possibly acted upon) element
    Element(ElementHandle),

    /// Text read from the element
    Text(String),

    /// The chain was short-circuited via `skip`; nothing ran
    Skipped,
}

impl ActionOutput {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutput::Skipped)
    }

    pub fn element(&self) -> Option<&ElementHandle> {
        match self {
            ActionOutput::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ActionOutput::Text(text) => Some(text),
            _ => None,
        }
    }
}
