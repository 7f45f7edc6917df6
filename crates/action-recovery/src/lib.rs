//! App-state recovery
//!
//! An action that fails for reasons other than a missing element (a system
//! dialog on top, a crashed app, a stuck webview) is often worth retrying
//! once the environment is repaired. The [`RecoveryManager`] runs registered
//! [`RecoveryStrategy`] implementations in priority order until one reports
//! success; [`RecoveryMiddleware`] then re-runs the action.

pub mod builtin;
pub mod errors;
pub mod manager;
mod middleware;
pub mod strategy;

pub use builtin::register_builtin_strategies;
pub use errors::RecoveryError;
pub use manager::{RecoveryConfig, RecoveryManager, RecoveryRecord, RecoveryStats};
pub use middleware::RecoveryMiddleware;
pub use strategy::RecoveryStrategy;
