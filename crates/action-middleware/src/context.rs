use element_cache::ElementCache;
use resilience_core_types::{ActionArgs, ActionId, ActionKind, Device, Locator};
use serde_json::Value;
use std::collections::HashMap;

/// Mutable record threaded through one `perform()` invocation
///
/// Middleware may rewrite `locator` or `args`, stash data for later
/// middleware in `extra`, or set `skip` to short-circuit the rest of the
/// chain.
pub struct ActionContext<'a> {
    pub action_id: ActionId,
    pub action: ActionKind,
    pub locator: Locator,
    pub args: ActionArgs,
    pub extra: HashMap<String, Value>,
    pub skip: bool,
    pub device: &'a dyn Device,
    pub cache: &'a mut ElementCache,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        action: ActionKind,
        locator: Locator,
        args: ActionArgs,
        device: &'a dyn Device,
        cache: &'a mut ElementCache,
    ) -> Self {
        Self {
            action_id: ActionId::new(),
            action,
            locator,
            args,
            extra: HashMap::new(),
            skip: false,
            device,
            cache,
        }
    }

    pub fn with_action_id(mut self, action_id: ActionId) -> Self {
        self.action_id = action_id;
        self
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl std::fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("action_id", &self.action_id)
            .field("action", &self.action)
            .field("locator", &self.locator)
            .field("args", &self.args)
            .field("extra", &self.extra)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}
