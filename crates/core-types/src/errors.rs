//! Error types shared by every pipeline crate

use crate::locator::Locator;
use thiserror::Error;

/// Errors reported by the automation driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No element matches the locator right now
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// Driver-side wait expired
    #[error("Driver timeout: {0}")]
    Timeout(String),

    /// The handle no longer refers to an attached element
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Element exists but cannot receive the interaction
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// A native alert is blocking the interaction
    #[error("Unexpected alert open: {0}")]
    UnexpectedAlert(String),

    /// No native alert is currently shown
    #[error("No alert open")]
    NoAlertOpen,

    /// The application under test stopped
    #[error("Application crashed: {0}")]
    AppCrashed(String),

    /// Requested automation context (native / webview) does not exist
    #[error("No such context: {0}")]
    NoSuchContext(String),

    /// Session or transport failure talking to the driver
    #[error("Session error: {0}")]
    Session(String),

    /// Operation not supported by this driver
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl DeviceError {
    /// Element could not be located (recoverable by self-healing)
    pub fn is_locator_miss(&self) -> bool {
        matches!(self, DeviceError::NoSuchElement(_) | DeviceError::Timeout(_))
    }

    /// Error means "keep polling" while waiting for an element to appear
    pub fn is_transient_lookup(&self) -> bool {
        matches!(
            self,
            DeviceError::NoSuchElement(_) | DeviceError::StaleElement(_)
        )
    }
}

/// Error surfaced by `perform()` and every middleware
///
/// The pipeline never wraps a failure in a new variant: whatever the
/// resolution wait or the driver produced is what the caller receives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The element did not appear within the resolution timeout
    #[error("Element not found: {locator} (waited {waited_ms}ms)")]
    ElementNotFound { locator: Locator, waited_ms: u64 },

    /// Error raised by the automation driver
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl ActionError {
    /// Locator-miss (not found / not ready) as opposed to a state-miss
    pub fn is_locator_miss(&self) -> bool {
        match self {
            ActionError::ElementNotFound { .. } => true,
            ActionError::Device(err) => err.is_locator_miss(),
        }
    }

    /// Cached handle went stale between probe and use
    pub fn is_stale(&self) -> bool {
        matches!(self, ActionError::Device(DeviceError::StaleElement(_)))
    }
}
