//! Action executor
//!
//! One [`ActionExecutor`] is one automation session: it owns the element
//! cache for that session and shares the configured chain, endpoint and
//! notifier with every other session built from the same pipeline.

use action_middleware::{ActionContext, Endpoint, MiddlewareChain};
use element_cache::ElementCache;
use resilience_core_types::{
    ActionArgs, ActionError, ActionId, ActionKind, ActionOutput, Device, ElementHandle, Locator,
};
use resilience_event_bus::{ActionEvent, ActionNotifier};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Runs actions for a single session
pub struct ActionExecutor {
    device: Arc<dyn Device>,
    cache: ElementCache,
    chain: Arc<MiddlewareChain>,
    endpoint: Arc<dyn Endpoint>,
    notifier: ActionNotifier,
}

impl ActionExecutor {
    pub fn new(
        device: Arc<dyn Device>,
        cache: ElementCache,
        chain: Arc<MiddlewareChain>,
        endpoint: Arc<dyn Endpoint>,
        notifier: ActionNotifier,
    ) -> Self {
        Self {
            device,
            cache,
            chain,
            endpoint,
            notifier,
        }
    }

    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }

    pub fn cache(&self) -> &ElementCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ElementCache {
        &mut self.cache
    }

    pub fn chain(&self) -> &Arc<MiddlewareChain> {
        &self.chain
    }

    pub fn notifier(&self) -> &ActionNotifier {
        &self.notifier
    }

    /// Perform one action through the chain
    ///
    /// Emits `action.before`, then `action.after` or `action.error`. A failed
    /// action drops the cache entry for its locator. The error returned is
    /// the one produced by the chain, never a wrapper.
    pub async fn perform(
        &mut self,
        action: ActionKind,
        locator: Locator,
        args: ActionArgs,
    ) -> Result<ActionOutput, ActionError> {
        let action_id = ActionId::new();
        let started = Instant::now();
        self.notifier
            .emit(ActionEvent::before(action_id.clone(), action, locator.clone()))
            .await;

        let result = {
            let mut ctx = ActionContext::new(
                action,
                locator.clone(),
                args,
                self.device.as_ref(),
                &mut self.cache,
            )
            .with_action_id(action_id.clone());
            self.chain.execute(&mut ctx, self.endpoint.as_ref()).await
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                debug!(action_id = %action_id, action = %action, elapsed_ms, "action done");
                self.notifier
                    .emit(ActionEvent::after(action_id, action, locator, elapsed_ms))
                    .await;
            }
            Err(err) => {
                warn!(action_id = %action_id, action = %action, error = %err, "action failed");
                self.cache.invalidate(&locator);
                self.notifier
                    .emit(ActionEvent::error(
                        action_id,
                        action,
                        locator,
                        elapsed_ms,
                        err.to_string(),
                    ))
                    .await;
            }
        }
        result
    }

    pub async fn click(&mut self, locator: Locator) -> Result<ActionOutput, ActionError> {
        self.perform(ActionKind::Click, locator, ActionArgs::none())
            .await
    }

    pub async fn type_text(
        &mut self,
        locator: Locator,
        text: impl Into<String>,
    ) -> Result<ActionOutput, ActionError> {
        self.perform(ActionKind::TypeText, locator, ActionArgs::text(text))
            .await
    }

    /// Visible text of the element; `None` when the chain was skipped
    pub async fn read_text(&mut self, locator: Locator) -> Result<Option<String>, ActionError> {
        let output = self
            .perform(ActionKind::ReadText, locator, ActionArgs::none())
            .await?;
        Ok(output.text().map(str::to_string))
    }

    /// Resolve the element without acting on it
    pub async fn locate(&mut self, locator: Locator) -> Result<Option<ElementHandle>, ActionError> {
        let output = self
            .perform(ActionKind::Locate, locator, ActionArgs::none())
            .await?;
        Ok(output.element().cloned())
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("cached", &self.cache.len())
            .field("middleware", &self.chain.names())
            .finish_non_exhaustive()
    }
}
