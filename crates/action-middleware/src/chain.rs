use crate::context::ActionContext;
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};
use std::sync::Arc;
use tracing::debug;

/// Interceptor wrapped around an action
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used by [`MiddlewareChain::remove`] and in logs
    fn name(&self) -> &str;

    /// Run around the rest of the chain; `next` may be called zero or more times
    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError>;
}

/// Innermost handler that actually performs the action
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError>;
}

/// Cursor over the middleware that have not run yet
#[derive(Clone, Copy)]
pub struct Next<'a> {
    remaining: &'a [&'a dyn Middleware],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub fn new(remaining: &'a [&'a dyn Middleware], endpoint: &'a dyn Endpoint) -> Self {
        Self {
            remaining,
            endpoint,
        }
    }

    /// Run the remaining chain; yields `Skipped` as soon as `ctx.skip` is set
    pub async fn run(self, ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        if ctx.skip {
            return Ok(ActionOutput::Skipped);
        }
        match self.remaining.split_first() {
            Some((head, rest)) => head.handle(ctx, Next::new(rest, self.endpoint)).await,
            None => self.endpoint.call(ctx).await,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

type Predicate = Arc<dyn Fn(&ActionContext<'_>) -> bool + Send + Sync>;

struct Registered {
    middleware: Arc<dyn Middleware>,
    predicate: Option<Predicate>,
}

/// Ordered middleware list; registration order is invocation order
#[derive(Default)]
pub struct MiddlewareChain {
    entries: Vec<Registered>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        debug!("middleware registered: {}", middleware.name());
        self.entries.push(Registered {
            middleware,
            predicate: None,
        });
        self
    }

    /// Register middleware that only joins executions matching `predicate`
    pub fn use_if<P>(&mut self, predicate: P, middleware: Arc<dyn Middleware>) -> &mut Self
    where
        P: Fn(&ActionContext<'_>) -> bool + Send + Sync + 'static,
    {
        debug!("conditional middleware registered: {}", middleware.name());
        self.entries.push(Registered {
            middleware,
            predicate: Some(Arc::new(predicate)),
        });
        self
    }

    /// Remove every middleware named `name`; returns whether any was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.middleware.name() != name);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.middleware.name().to_string())
            .collect()
    }

    /// Run the chain around `endpoint`
    ///
    /// Predicates are evaluated once, against the context as it is on entry.
    pub async fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
        endpoint: &dyn Endpoint,
    ) -> Result<ActionOutput, ActionError> {
        if ctx.skip {
            return Ok(ActionOutput::Skipped);
        }

        let view: &ActionContext<'_> = ctx;
        let active: Vec<&dyn Middleware> = self
            .entries
            .iter()
            .filter(|entry| match &entry.predicate {
                Some(predicate) => predicate(view),
                None => true,
            })
            .map(|entry| entry.middleware.as_ref())
            .collect();

        Next::new(&active, endpoint).run(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use element_cache::ElementCache;
    use resilience_core_types::fake::FakeDevice;
    use resilience_core_types::{ActionArgs, ActionKind, ElementHandle, Locator};
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tracing {
        name: &'static str,
        trace: Trace,
    }

    #[async_trait]
    impl Middleware for Tracing {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(
            &self,
            ctx: &mut ActionContext<'_>,
            next: Next<'_>,
        ) -> Result<ActionOutput, ActionError> {
            self.trace.lock().unwrap().push(format!("{}-before", self.name));
            let result = next.run(ctx).await;
            self.trace.lock().unwrap().push(format!("{}-after", self.name));
            result
        }
    }

    struct Skipper;

    #[async_trait]
    impl Middleware for Skipper {
        fn name(&self) -> &str {
            "skipper"
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

    /// Records how many middleware are still ahead of it
    struct Depth {
        name: &'static str,
        trace: Trace,
    }

    #[async_trait]
    impl Middleware for Depth {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(
            &self,
            ctx: &mut ActionContext<'_>,
            next: Next<'_>,
        ) -> Result<ActionOutput, ActionError> {
            self.trace
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, next.remaining()));
            next.run(ctx).await
        }
    }

    struct Core {
        trace: Trace,
    }

    #[async_trait]
    impl Endpoint for Core {
        async fn call(&self, _ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError> {
            self.trace.lock().unwrap().push("core".to_string());
            Ok(ActionOutput::Element(ElementHandle::new("el-1")))
        }
    }

    fn tracing(name: &'static str, trace: &Trace) -> Arc<dyn Middleware> {
        Arc::new(Tracing {
            name,
            trace: trace.clone(),
        })
    }

    #[tokio::test]
    async fn test_first_registered_is_outermost() {
        let trace: Trace = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain
            .use_middleware(tracing("A", &trace))
            .use_middleware(tracing("B", &trace));

        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::Click,
            Locator::id("btn"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        let output = chain
            .execute(&mut ctx, &Core { trace: trace.clone() })
            .await
            .unwrap();

        assert_eq!(output, ActionOutput::Element(ElementHandle::new("el-1")));
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["A-before", "B-before", "core", "B-after", "A-after"]
        );
    }

    #[tokio::test]
    async fn test_skip_short_circuits_rest_of_chain() {
        let trace: Trace = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain
            .use_middleware(tracing("A", &trace))
            .use_middleware(Arc::new(Skipper))
            .use_middleware(tracing("C", &trace));

        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::Click,
            Locator::id("btn"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        let output = chain
            .execute(&mut ctx, &Core { trace: trace.clone() })
            .await
            .unwrap();

        assert!(output.is_skipped());
        assert_eq!(*trace.lock().unwrap(), vec!["A-before", "A-after"]);
    }

    #[tokio::test]
    async fn test_skip_before_execute_runs_nothing() {
        let trace: Trace = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(tracing("A", &trace));

        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::Click,
            Locator::id("btn"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        ctx.skip = true;
        let output = chain
            .execute(&mut ctx, &Core { trace: trace.clone() })
            .await
            .unwrap();

        assert!(output.is_skipped());
        assert!(trace.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_use_if_excludes_non_matching_actions() {
        let trace: Trace = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain
            .use_middleware(tracing("A", &trace))
            .use_if(|ctx| ctx.action == ActionKind::Click, tracing("click-only", &trace));

        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::ReadText,
            Locator::id("label"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        chain
            .execute(&mut ctx, &Core { trace: trace.clone() })
            .await
            .unwrap();

        assert_eq!(*trace.lock().unwrap(), vec!["A-before", "core", "A-after"]);
    }

    #[tokio::test]
    async fn test_remaining_counts_only_active_middleware() {
        let trace: Trace = Arc::default();
        let depth = |name: &'static str| -> Arc<dyn Middleware> {
            Arc::new(Depth {
                name,
                trace: trace.clone(),
            })
        };
        let mut chain = MiddlewareChain::new();
        chain
            .use_middleware(depth("A"))
            .use_if(|ctx| ctx.action == ActionKind::Click, depth("click-only"))
            .use_middleware(depth("C"));

        let device = FakeDevice::new();
        let mut cache = ElementCache::default();
        let mut ctx = ActionContext::new(
            ActionKind::ReadText,
            Locator::id("label"),
            ActionArgs::none(),
            &device,
            &mut cache,
        );
        chain
            .execute(&mut ctx, &Core { trace: trace.clone() })
            .await
            .unwrap();

        assert_eq!(*trace.lock().unwrap(), vec!["A:1", "C:0", "core"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let trace: Trace = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain
            .use_middleware(tracing("A", &trace))
            .use_middleware(tracing("B", &trace));

        assert!(chain.remove("A"));
        assert!(!chain.remove("A"));
        assert_eq!(chain.names(), vec!["B"]);

        chain.clear();
        assert!(chain.is_empty());
    }
}
