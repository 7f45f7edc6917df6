use crate::chain::{Middleware, Next};
use crate::context::ActionContext;
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Re-run the rest of the chain up to `max_retries` times
///
/// On exhaustion the error of the first attempt is returned.
#[derive(Debug, Clone, Copy)]
pub struct RetryMiddleware {
    max_retries: u32,
    delay: Duration,
}

impl RetryMiddleware {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryMiddleware {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

#[async_trait]
impl Middleware for RetryMiddleware {
    fn name(&self) -> &str {
        "retry"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        let first_error = match next.run(ctx).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        for attempt in 1..=self.max_retries {
            warn!(
                action_id = %ctx.action_id,
                action = %ctx.action,
                attempt,
                delay_ms = self.delay.as_millis() as u64,
                "Action failed, retrying: {}",
                first_error
            );
            sleep(self.delay).await;

            if let Ok(output) = next.run(ctx).await {
                return Ok(output);
            }
        }

        if self.max_retries > 0 {
            error!(
                action_id = %ctx.action_id,
                action = %ctx.action,
                "Action still failing after {} retries",
                self.max_retries
            );
        }
        Err(first_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Endpoint, MiddlewareChain};
    use element_cache::ElementCache;
    use resilience_core_types::fake::FakeDevice;
    use resilience_core_types::{ActionArgs, ActionKind, DeviceError, Locator};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails with a numbered error until `succeed_on` calls were made
    struct Flaky {
        calls: AtomicU32,
        succeed_on: u32,
    }

    #[async_trait]
    impl Endpoint for Flaky {
        async fn call(&self, _ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_on {
                Ok(ActionOutput::Text("ok".into()))
            } else {
                Err(DeviceError::NotInteractable(format!("attempt {}", call)).into())
            }
        }
    }

    fn chain(max_retries: u32) -> MiddlewareChain {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(Arc::new(RetryMiddleware::new(
            max_retries,
            Duration::from_millis(100),
        )));
        chain
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_later_attempt() {
        let endpoint = Flaky {
            calls: AtomicU32::new(0),
            succeed_on: 3,
        };
        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::ReadText,
            Locator::id("label"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );

        let output = chain(2).execute(&mut ctx, &endpoint).await.unwrap();
        assert_eq!(output.text(), Some("ok"));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_first_error() {
        let endpoint = Flaky {
            calls: AtomicU32::new(0),
            succeed_on: u32::MAX,
        };
        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::Click,
            Locator::id("btn"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );

        let err = chain(2).execute(&mut ctx, &endpoint).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::Device(DeviceError::NotInteractable("attempt 1".into()))
        );
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 3);
    }
}
