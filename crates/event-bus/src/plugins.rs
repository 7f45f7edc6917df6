use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::events::{ActionEvent, ActionEventKind};

/// Hook points a plugin can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookSlot {
    BeforeAction,
    AfterAction,
    ActionError,
}

impl HookSlot {
    pub fn name(&self) -> &'static str {
        match self {
            HookSlot::BeforeAction => "before_action",
            HookSlot::AfterAction => "after_action",
            HookSlot::ActionError => "action_error",
        }
    }

    pub fn for_event(kind: ActionEventKind) -> Self {
        match kind {
            ActionEventKind::Before => HookSlot::BeforeAction,
            ActionEventKind::After => HookSlot::AfterAction,
            ActionEventKind::Error => HookSlot::ActionError,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("Plugin name must not be empty")]
    EmptyName,

    #[error("Plugin '{0}' declares no hook slots")]
    NoSlots(String),

    #[error("Plugin '{0}' is already registered")]
    Duplicate(String),

    #[error("Plugin hook failed: {0}")]
    Hook(String),
}

/// Extension point observing performed actions
///
/// A plugin declares which slots it implements; only those are invoked.
/// Hook failures are logged and never reach the action.
pub trait ActionPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn slots(&self) -> &[HookSlot];

    fn before_action(&self, _event: &ActionEvent) -> Result<(), PluginError> {
        Ok(())
    }

    fn after_action(&self, _event: &ActionEvent) -> Result<(), PluginError> {
        Ok(())
    }

    fn action_error(&self, _event: &ActionEvent) -> Result<(), PluginError> {
        Ok(())
    }
}

struct Registered {
    plugin: Arc<dyn ActionPlugin>,
    slots: HashSet<HookSlot>,
}

/// Ordered set of plugins, dispatched in registration order
#[derive(Default)]
pub struct PluginHost {
    plugins: RwLock<Vec<Registered>>,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, plugin: Arc<dyn ActionPlugin>) -> Result<(), PluginError> {
        let name = plugin.name().trim().to_string();
        if name.is_empty() {
            return Err(PluginError::EmptyName);
        }
        let slots: HashSet<HookSlot> = plugin.slots().iter().copied().collect();
        if slots.is_empty() {
            return Err(PluginError::NoSlots(name));
        }

        let mut plugins = self.plugins.write();
        if plugins.iter().any(|r| r.plugin.name() == name) {
            return Err(PluginError::Duplicate(name));
        }
        debug!(plugin = %name, slots = slots.len(), "plugin registered");
        plugins.push(Registered { plugin, slots });
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut plugins = self.plugins.write();
        let before = plugins.len();
        plugins.retain(|r| r.plugin.name() != name);
        plugins.len() != before
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins
            .read()
            .iter()
            .map(|r| r.plugin.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Invoke the matching slot of every plugin that declared it
    pub fn dispatch(&self, event: &ActionEvent) {
        let slot = HookSlot::for_event(event.kind);
        let targets: Vec<Arc<dyn ActionPlugin>> = self
            .plugins
            .read()
            .iter()
            .filter(|r| r.slots.contains(&slot))
            .map(|r| r.plugin.clone())
            .collect();

        for plugin in targets {
            let result = match slot {
                HookSlot::BeforeAction => plugin.before_action(event),
                HookSlot::AfterAction => plugin.after_action(event),
                HookSlot::ActionError => plugin.action_error(event),
            };
            if let Err(err) = result {
                warn!(
                    plugin = plugin.name(),
                    hook = slot.name(),
                    error = %err,
                    "plugin hook failed"
                );
            }
        }
    }
}
