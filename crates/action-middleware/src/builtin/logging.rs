use crate::chain::{Middleware, Next};
use crate::context::ActionContext;
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Structured log line around each action
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        let started = Instant::now();
        info!(
            action_id = %ctx.action_id,
            action = %ctx.action,
            locator = %ctx.locator,
            "Executing action"
        );

        let result = next.run(ctx).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(output) if output.is_skipped() => {
                debug!(action_id = %ctx.action_id, "Action skipped by middleware");
            }
            Ok(_) => {
                info!(
                    action_id = %ctx.action_id,
                    elapsed_ms,
                    "Action completed"
                );
            }
            Err(err) => {
                warn!(
                    action_id = %ctx.action_id,
                    action = %ctx.action,
                    locator = %ctx.locator,
                    elapsed_ms,
                    error = %err,
                    "Action failed"
                );
            }
        }

        result
    }
}
