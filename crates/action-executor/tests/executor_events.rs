use action_executor::ActionExecutor;
use action_middleware::{ActionContext, Middleware, MiddlewareChain, Next};
use action_primitives::{PrimitiveEndpoint, WaitOptions};
use async_trait::async_trait;
use element_cache::ElementCache;
use parking_lot::Mutex;
use resilience_core_types::fake::{FakeDevice, FakeOp};
use resilience_core_types::{ActionError, ActionOutput, DeviceError, Locator};
use resilience_event_bus::{ActionEventKind, ActionNotifier};
use std::sync::Arc;
use std::time::Duration;

fn executor(device: Arc<FakeDevice>, chain: MiddlewareChain) -> ActionExecutor {
    let endpoint = PrimitiveEndpoint::new(WaitOptions::new(
        Duration::from_secs(1),
        Duration::from_millis(100),
    ));
    ActionExecutor::new(
        device,
        ElementCache::default(),
        Arc::new(chain),
        Arc::new(endpoint),
        ActionNotifier::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_successful_click_emits_before_then_after() {
    let device = Arc::new(FakeDevice::new());
    let locator = Locator::id("btn_login");
    device.add_element(locator.clone(), "Login");
    let mut executor = executor(device.clone(), MiddlewareChain::new());
    let mut rx = executor.notifier().subscribe();

    executor.click(locator.clone()).await.unwrap();

    let before = rx.recv().await.unwrap();
    let after = rx.recv().await.unwrap();
    assert_eq!(before.kind, ActionEventKind::Before);
    assert_eq!(after.kind, ActionEventKind::After);
    assert_eq!(before.action_id, after.action_id);
    assert_eq!(after.locator, locator);
    assert!(after.error.is_none());
    assert!(executor.cache().contains(&locator));
}

#[tokio::test(start_paused = true)]
async fn test_failure_emits_error_and_drops_cache_entry() {
    let device = Arc::new(FakeDevice::new());
    let locator = Locator::id("btn_pay");
    device.add_element(locator.clone(), "Pay");
    let mut executor = executor(device.clone(), MiddlewareChain::new());

    executor.locate(locator.clone()).await.unwrap();
    assert!(executor.cache().contains(&locator));

    let mut rx = executor.notifier().subscribe();
    device.fail_next(FakeOp::Click, DeviceError::AppCrashed("com.example".into()));
    let err = executor.click(locator.clone()).await.unwrap_err();

    assert!(matches!(err, ActionError::Device(DeviceError::AppCrashed(_))));
    assert!(!executor.cache().contains(&locator));
    assert_eq!(rx.recv().await.unwrap().kind, ActionEventKind::Before);
    let failed = rx.recv().await.unwrap();
    assert_eq!(failed.name(), "action.error");
    assert_eq!(failed.error, Some(err.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_missing_element_reports_elapsed_wait() {
    let device = Arc::new(FakeDevice::new());
    let mut executor = executor(device, MiddlewareChain::new());
    let mut rx = executor.notifier().subscribe();

    let err = executor.read_text(Locator::id("ghost")).await.unwrap_err();

    assert!(err.is_locator_miss());
    rx.recv().await.unwrap();
    let failed = rx.recv().await.unwrap();
    assert_eq!(failed.kind, ActionEventKind::Error);
    assert_eq!(failed.elapsed_ms, Some(1000));
}

#[tokio::test(start_paused = true)]
async fn test_type_text_and_read_back() {
    let device = Arc::new(FakeDevice::new());
    let field = device.add_element(Locator::id("username"), "");
    device.add_element(Locator::id("title"), "Welcome");
    let mut executor = executor(device.clone(), MiddlewareChain::new());

    executor.type_text(Locator::id("username"), "alice").await.unwrap();
    let title = executor.read_text(Locator::id("title")).await.unwrap();

    assert_eq!(device.typed_text(&field).as_deref(), Some("alice"));
    assert_eq!(title.as_deref(), Some("Welcome"));
}

struct SkipAll;

#[async_trait]
impl Middleware for SkipAll {
    fn name(&self) -> &str {
        "skip_all"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        ctx.skip = true;
        next.run(ctx).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_skipped_action_touches_nothing() {
    let device = Arc::new(FakeDevice::new());
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(Arc::new(SkipAll));
    let mut executor = executor(device.clone(), chain);

    let located = executor.locate(Locator::id("anything")).await.unwrap();

    assert!(located.is_none());
    assert!(device.calls().is_empty());
}

struct Recorder(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl Middleware for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        self.0.lock().push(ctx.action_id.to_string());
        next.run(ctx).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_chain_sees_event_action_id() {
    let device = Arc::new(FakeDevice::new());
    device.add_element(Locator::id("ok"), "OK");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(Arc::new(Recorder(seen.clone())));
    let mut executor = executor(device, chain);
    let mut rx = executor.notifier().subscribe();

    executor.click(Locator::id("ok")).await.unwrap();

    let before = rx.recv().await.unwrap();
    assert_eq!(seen.lock().as_slice(), &[before.action_id.to_string()]);
}
