use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::{EventBus, InMemoryBus};
use crate::events::ActionEvent;
use crate::plugins::PluginHost;

const DEFAULT_BUS_CAPACITY: usize = 256;

/// Fans action events out to plugins and bus subscribers
#[derive(Clone)]
pub struct ActionNotifier {
    bus: Arc<InMemoryBus<ActionEvent>>,
    plugins: Arc<PluginHost>,
}

impl ActionNotifier {
    pub fn new(bus: Arc<InMemoryBus<ActionEvent>>, plugins: Arc<PluginHost>) -> Self {
        Self { bus, plugins }
    }

    pub fn plugins(&self) -> &Arc<PluginHost> {
        &self.plugins
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActionEvent> {
        self.bus.subscribe()
    }

    /// Plugins run first, in registration order; then the bus is published.
    pub async fn emit(&self, event: ActionEvent) {
        self.plugins.dispatch(&event);
        self.bus.publish(event).await;
    }
}

impl Default for ActionNotifier {
    fn default() -> Self {
        Self::new(
            InMemoryBus::new(DEFAULT_BUS_CAPACITY),
            Arc::new(PluginHost::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ActionEventKind;
    use resilience_core_types::{ActionId, ActionKind, Locator};

    #[tokio::test]
    async fn test_emit_without_listeners() {
        let notifier = ActionNotifier::default();
        notifier
            .emit(ActionEvent::before(ActionId::new(), ActionKind::Click, Locator::id("btn")))
            .await;
    }

    #[tokio::test]
    async fn test_subscriber_sees_event_sequence() {
        let notifier = ActionNotifier::default();
        let mut rx = notifier.subscribe();
        let id = ActionId::new();

        notifier
            .emit(ActionEvent::before(id.clone(), ActionKind::Click, Locator::id("btn")))
            .await;
        notifier
            .emit(ActionEvent::error(id.clone(), ActionKind::Click, Locator::id("btn"), 12, "boom"))
            .await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, ActionEventKind::Before);
        assert_eq!(second.name(), "action.error");
        assert_eq!(second.action_id, id);
        assert_eq!(second.error.as_deref(), Some("boom"));
    }
}
