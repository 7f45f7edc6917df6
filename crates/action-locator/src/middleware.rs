use crate::healer::SelfHealer;
use action_middleware::{ActionContext, Middleware, Next};
use action_primitives::apply;
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default wait for the original locator before healing kicks in
pub const DEFAULT_HEAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Heals locator-misses and re-applies the action on the healed element
///
/// Any other error passes through untouched, as does the original error when
/// healing finds nothing.
pub struct SelfHealingMiddleware {
    healer: Arc<SelfHealer>,
    timeout: Duration,
}

impl SelfHealingMiddleware {
    pub fn new(healer: Arc<SelfHealer>) -> Self {
        Self {
            healer,
            timeout: DEFAULT_HEAL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn healer(&self) -> &Arc<SelfHealer> {
        &self.healer
    }
}

#[async_trait]
impl Middleware for SelfHealingMiddleware {
    fn name(&self) -> &str {
        "self_healing"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        let original_error = match next.run(ctx).await {
            Ok(output) => return Ok(output),
            Err(err) if !err.is_locator_miss() => return Err(err),
            Err(err) => err,
        };

        let resolution = match self
            .healer
            .find_element(ctx.device, &ctx.locator, self.timeout)
            .await
        {
            Ok(resolution) => resolution,
            Err(_) => return Err(original_error),
        };

        if let Some(heuristic) = resolution.healed_by {
            info!(
                action_id = %ctx.action_id,
                healed = %resolution.locator,
                strategy = heuristic.name(),
                "re-applying action on healed element"
            );
            ctx.set_extra("healed_locator", resolution.locator.to_string());
            ctx.set_extra("healed_by", heuristic.name());
        }

        apply(ctx.device, &resolution.element, ctx.action, &ctx.args).await
    }
}
