//! Errors raised while building a pipeline
//!
//! Action failures never show up here: `perform()` hands back the
//! [`ActionError`](resilience_core_types::ActionError) produced by the chain.

use action_recovery::RecoveryError;
use resilience_event_bus::PluginError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResilienceError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

pub type Result<T> = std::result::Result<T, ResilienceError>;
