//! Mobile UI action resilience
//!
//! Wraps every UI action in a middleware chain that caches resolved
//! elements, heals broken locators against the live UI hierarchy and
//! repairs unexpected app state before retrying.
//!
//! ```ignore
//! let pipeline = Pipeline::from_config(ResilienceConfig::load(None)?)?;
//! let mut session = pipeline.session(device);
//! session.click(Locator::id("btn_login")).await?;
//! println!("{}", pipeline.heal_report());
//! ```

pub mod config;
pub mod errors;
pub mod pipeline;
pub mod telemetry;

pub use config::ResilienceConfig;
pub use errors::{ResilienceError, Result};
pub use pipeline::{Pipeline, PipelineBuilder};

pub use action_executor::ActionExecutor;
pub use action_locator::{HealHistory, HealRecord, Heuristic};
pub use action_middleware::{ActionContext, Middleware, MiddlewareChain, Next, TimingReport};
pub use action_recovery::{RecoveryManager, RecoveryRecord, RecoveryStats, RecoveryStrategy};
pub use resilience_core_types::{
    ActionArgs, ActionError, ActionKind, ActionOutput, Device, DeviceError, ElementHandle,
    Locator, LocatorStrategy,
};
pub use resilience_event_bus::{ActionEvent, ActionEventKind, ActionPlugin, HookSlot};
