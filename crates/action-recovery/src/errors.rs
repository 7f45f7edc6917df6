//! Error types for strategy registration

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("Recovery strategy name must not be empty")]
    EmptyName,

    #[error("Recovery strategy '{0}' is already registered")]
    Duplicate(String),
}
