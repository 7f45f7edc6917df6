//! Pipeline assembly
//!
//! A [`Pipeline`] is built once from configuration and shared by every
//! session. It owns the read-only parts (middleware chain, endpoint,
//! recovery strategies, plugins) and the shared histories; each
//! [`ActionExecutor`] handed out by [`Pipeline::session`] owns its own
//! element cache.

use crate::config::ResilienceConfig;
use crate::errors::Result;
use action_executor::ActionExecutor;
use action_locator::{HealHistory, HealRecord, SelfHealer, SelfHealingMiddleware};
use action_middleware::{
    LoggingMiddleware, Middleware, MiddlewareChain, RetryMiddleware, TimingMiddleware,
    TimingReport,
};
use action_primitives::PrimitiveEndpoint;
use action_recovery::{RecoveryManager, RecoveryMiddleware, RecoveryStats, RecoveryStrategy};
use element_cache::ElementCache;
use resilience_core_types::Device;
use resilience_event_bus::{ActionNotifier, ActionPlugin, InMemoryBus, PluginHost};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Events buffered per bus subscriber before the slowest one lags
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Collects extensions before the pipeline is assembled
pub struct PipelineBuilder {
    config: ResilienceConfig,
    middleware: Vec<Arc<dyn Middleware>>,
    strategies: Vec<(String, i32, Arc<dyn RecoveryStrategy>)>,
    plugins: Vec<Arc<dyn ActionPlugin>>,
}

impl PipelineBuilder {
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            config,
            middleware: Vec::new(),
            strategies: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Custom middleware; runs inside timing, outside retry/recovery/healing
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Recovery strategy registered next to the built-in ones
    pub fn strategy(
        mut self,
        name: impl Into<String>,
        priority: i32,
        strategy: Arc<dyn RecoveryStrategy>,
    ) -> Self {
        self.strategies.push((name.into(), priority, strategy));
        self
    }

    pub fn plugin(mut self, plugin: Arc<dyn ActionPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Validate the configuration and wire everything together
    ///
    /// Chain order, outermost first: logging, timing, custom middleware,
    /// retry (when `retry.max_retries > 0`), recovery, self-healing.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config;
        config.validate()?;

        let recovery = Arc::new(RecoveryManager::with_builtin(config.recovery_config())?);
        for (name, priority, strategy) in self.strategies {
            recovery.register(name, priority, strategy)?;
        }

        let plugins = Arc::new(PluginHost::new());
        for plugin in self.plugins {
            plugins.register(plugin)?;
        }

        let heal_history = Arc::new(HealHistory::new(config.healing.history_capacity));
        let timing = Arc::new(TimingMiddleware::new(Duration::from_millis(
            config.timing.warn_threshold_ms,
        )));

        let mut chain = MiddlewareChain::new();
        chain.use_middleware(Arc::new(LoggingMiddleware::new()));
        chain.use_middleware(timing.clone());
        for middleware in self.middleware {
            chain.use_middleware(middleware);
        }
        if config.retry.max_retries > 0 {
            chain.use_middleware(Arc::new(RetryMiddleware::new(
                config.retry.max_retries,
                Duration::from_millis(config.retry.delay_ms),
            )));
        }
        if config.recovery.enabled {
            chain.use_middleware(Arc::new(
                RecoveryMiddleware::new(recovery.clone())
                    .with_max_recovery_retries(config.recovery.max_recovery_retries)
                    .with_recover_locator_misses(config.recovery.recover_locator_misses),
            ));
        }
        if config.healing.enabled {
            let healer = SelfHealer::new(heal_history.clone())
                .with_max_candidates(config.healing.max_candidates)
                .with_poll_interval(Duration::from_millis(config.action.poll_interval_ms));
            chain.use_middleware(Arc::new(
                SelfHealingMiddleware::new(Arc::new(healer))
                    .with_timeout(Duration::from_millis(config.healing.timeout_ms)),
            ));
        }

        info!(
            middleware = ?chain.names(),
            strategies = ?recovery.strategy_names(),
            plugins = plugins.len(),
            "resilience pipeline ready"
        );

        let notifier = ActionNotifier::new(InMemoryBus::new(EVENT_BUS_CAPACITY), plugins);
        Ok(Pipeline {
            endpoint: Arc::new(PrimitiveEndpoint::new(config.wait_options())),
            chain: Arc::new(chain),
            notifier,
            heal_history,
            recovery,
            timing,
            config,
        })
    }
}

/// Shared, configured pipeline handing out per-session executors
pub struct Pipeline {
    config: ResilienceConfig,
    chain: Arc<MiddlewareChain>,
    endpoint: Arc<PrimitiveEndpoint>,
    notifier: ActionNotifier,
    heal_history: Arc<HealHistory>,
    recovery: Arc<RecoveryManager>,
    timing: Arc<TimingMiddleware>,
}

impl Pipeline {
    pub fn builder(config: ResilienceConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    pub fn from_config(config: ResilienceConfig) -> Result<Self> {
        PipelineBuilder::new(config).build()
    }

    /// New session driving `device`, with an empty cache of its own
    pub fn session(&self, device: Arc<dyn Device>) -> ActionExecutor {
        ActionExecutor::new(
            device,
            ElementCache::new(self.config.cache_config()),
            self.chain.clone(),
            self.endpoint.clone(),
            self.notifier.clone(),
        )
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    pub fn middleware_names(&self) -> Vec<String> {
        self.chain.names()
    }

    pub fn notifier(&self) -> &ActionNotifier {
        &self.notifier
    }

    pub fn plugins(&self) -> &Arc<PluginHost> {
        self.notifier.plugins()
    }

    pub fn heal_history(&self) -> &Arc<HealHistory> {
        &self.heal_history
    }

    pub fn heal_records(&self) -> Vec<HealRecord> {
        self.heal_history.records()
    }

    pub fn heal_report(&self) -> String {
        self.heal_history.report()
    }

    pub fn recovery(&self) -> &Arc<RecoveryManager> {
        &self.recovery
    }

    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery.stats()
    }

    pub fn recovery_report(&self) -> String {
        self.recovery.report()
    }

    pub fn timing_report(&self) -> TimingReport {
        self.timing.report()
    }
}
