use action_middleware::{ActionContext, Endpoint, MiddlewareChain, TimingMiddleware};
use async_trait::async_trait;
use element_cache::ElementCache;
use resilience_core_types::fake::FakeDevice;
use resilience_core_types::{ActionArgs, ActionError, ActionKind, ActionOutput, Locator};
use std::sync::Arc;
use std::time::Duration;

/// Sleeps for the number of milliseconds encoded in the locator value
struct Sleeper;

#[async_trait]
impl Endpoint for Sleeper {
    async fn call(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        let ms: u64 = ctx.locator.value.parse().unwrap();
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(ActionOutput::Text(String::new()))
    }
}

#[tokio::test(start_paused = true)]
async fn report_lists_five_slowest_actions() {
    let timing = Arc::new(TimingMiddleware::new(Duration::from_secs(5)));
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(timing.clone());

    let device = FakeDevice::new();
    let mut cache = ElementCache::default();
    for ms in [10u64, 70, 20, 60, 30, 50, 40] {
        let mut ctx = ActionContext::new(
            ActionKind::ReadText,
            Locator::id(ms.to_string()),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        chain.execute(&mut ctx, &Sleeper).await.unwrap();
    }

    let report = timing.report();
    assert_eq!(report.total, 7);
    assert_eq!(report.max_ms, 70);
    assert!((report.avg_ms - 40.0).abs() < f64::EPSILON);
    let slowest: Vec<u64> = report.slowest.iter().map(|r| r.elapsed_ms).collect();
    assert_eq!(slowest, vec![70, 60, 50, 40, 30]);
    assert!(report.slowest.iter().all(|r| r.success));
}

#[tokio::test]
async fn empty_report_is_all_zero() {
    let report = TimingMiddleware::default().report();
    assert_eq!(report.total, 0);
    assert_eq!(report.max_ms, 0);
    assert!(report.slowest.is_empty());
}
