//! Notification surface of the pipeline
//!
//! Every `perform()` publishes `action.before`, then `action.after` or
//! `action.error`. Events go to an in-memory broadcast bus and to registered
//! plugins. Nothing in the pipeline depends on anyone listening.

mod bus;
mod events;
mod notifier;
mod plugins;

pub use bus::{Event, EventBus, InMemoryBus};
pub use events::{ActionEvent, ActionEventKind};
pub use notifier::ActionNotifier;
pub use plugins::{ActionPlugin, HookSlot, PluginError, PluginHost};
