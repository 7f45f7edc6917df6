use crate::manager::RecoveryManager;
use action_middleware::{ActionContext, Middleware, Next};
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};
use std::sync::Arc;
use tracing::{debug, info};

/// Repairs the app state after a failed action and runs it again
///
/// Locator-misses are left to self-healing unless
/// `recover_locator_misses` is set. When recovery fails or the retries are
/// used up, the error of the first failure is returned.
pub struct RecoveryMiddleware {
    manager: Arc<RecoveryManager>,
    max_recovery_retries: u32,
    recover_locator_misses: bool,
}

impl RecoveryMiddleware {
    pub fn new(manager: Arc<RecoveryManager>) -> Self {
        Self {
            manager,
            max_recovery_retries: 1,
            recover_locator_misses: false,
        }
    }

    pub fn with_max_recovery_retries(mut self, retries: u32) -> Self {
        self.max_recovery_retries = retries;
        self
    }

    pub fn with_recover_locator_misses(mut self, recover: bool) -> Self {
        self.recover_locator_misses = recover;
        self
    }

    pub fn manager(&self) -> &Arc<RecoveryManager> {
        &self.manager
    }
}

#[async_trait]
impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &str {
        "recovery"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        let original_error = match next.run(ctx).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };
        if original_error.is_locator_miss() && !self.recover_locator_misses {
            return Err(original_error);
        }

        for attempt in 1..=self.max_recovery_retries {
            info!(
                action_id = %ctx.action_id,
                action = %ctx.action,
                attempt,
                error = %original_error,
                "action failed, attempting recovery"
            );
            if !self.manager.try_recover(ctx.device).await {
                break;
            }
            match next.run(ctx).await {
                Ok(output) => return Ok(output),
                Err(err) => debug!(action_id = %ctx.action_id, "retry after recovery failed: {}", err),
            }
        }

        Err(original_error)
    }
}
