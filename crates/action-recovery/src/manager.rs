//! Strategy registry and the recovery loop

use crate::errors::RecoveryError;
use crate::strategy::RecoveryStrategy;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use resilience_core_types::{Device, RecordLog, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Outcome of one strategy invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub strategy_name: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub detail: String,
}

/// Aggregate over the recovery history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryStats {
    pub total_attempts: usize,
    pub success: usize,
    pub fail: usize,
    /// Registered strategy names, in execution order
    pub strategies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryConfig {
    pub enabled: bool,
    /// Passes over the whole strategy list before giving up
    pub max_attempts: u32,
    /// Pause after a successful repair so the UI can settle
    pub settle_time: Duration,
    pub history_capacity: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            settle_time: Duration::from_secs(1),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Clone)]
struct Registered {
    name: String,
    priority: i32,
    strategy: Arc<dyn RecoveryStrategy>,
}

/// Runs recovery strategies in ascending priority order
pub struct RecoveryManager {
    strategies: RwLock<Vec<Registered>>,
    history: RecordLog<RecoveryRecord>,
    enabled: AtomicBool,
    max_attempts: u32,
    settle_time: Duration,
}

impl RecoveryManager {
    /// Manager with no strategies registered
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            strategies: RwLock::new(Vec::new()),
            history: RecordLog::new(config.history_capacity),
            enabled: AtomicBool::new(config.enabled),
            max_attempts: config.max_attempts,
            settle_time: config.settle_time,
        }
    }

    /// Manager pre-loaded with the built-in strategies
    pub fn with_builtin(config: RecoveryConfig) -> Result<Self, RecoveryError> {
        let manager = Self::new(config);
        crate::builtin::register_builtin_strategies(&manager)?;
        Ok(manager)
    }

    /// Add a strategy; lower `priority` runs first, ties keep registration order
    pub fn register(
        &self,
        name: impl Into<String>,
        priority: i32,
        strategy: Arc<dyn RecoveryStrategy>,
    ) -> Result<(), RecoveryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RecoveryError::EmptyName);
        }

        let mut strategies = self.strategies.write();
        if strategies.iter().any(|s| s.name == name) {
            return Err(RecoveryError::Duplicate(name));
        }
        debug!("recovery strategy registered: {} (priority={})", name, priority);
        strategies.push(Registered {
            name,
            priority,
            strategy,
        });
        strategies.sort_by_key(|s| s.priority);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut strategies = self.strategies.write();
        let before = strategies.len();
        strategies.retain(|s| s.name != name);
        strategies.len() != before
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.read().iter().map(|s| s.name.clone()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Try to bring the app back into a usable state
    ///
    /// Returns `true` on the first strategy that reports success, `false`
    /// once `max_attempts` passes over every strategy found nothing to fix.
    pub async fn try_recover(&self, device: &dyn Device) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let strategies: Vec<Registered> = self.strategies.read().clone();
        for attempt in 1..=self.max_attempts {
            for entry in &strategies {
                match entry.strategy.recover(device).await {
                    Ok(true) => {
                        self.record(&entry.name, true, format!("attempt {}", attempt));
                        info!(
                            strategy = %entry.name,
                            attempt,
                            "recovered"
                        );
                        sleep(self.settle_time).await;
                        return true;
                    }
                    Ok(false) => {
                        self.record(&entry.name, false, String::new());
                    }
                    Err(err) => {
                        debug!("recovery strategy {} failed: {}", entry.name, err);
                        self.record(&entry.name, false, err.to_string());
                    }
                }
            }
        }

        warn!(
            attempts = self.max_attempts,
            strategies = strategies.len(),
            "all recovery strategies failed"
        );
        false
    }

    /// Newest `limit` records, oldest first
    pub fn history(&self, limit: usize) -> Vec<RecoveryRecord> {
        self.history.tail(limit)
    }

    pub fn records(&self) -> Vec<RecoveryRecord> {
        self.history.snapshot()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn stats(&self) -> RecoveryStats {
        let records = self.history.snapshot();
        let success = records.iter().filter(|r| r.success).count();
        RecoveryStats {
            total_attempts: records.len(),
            success,
            fail: records.len() - success,
            strategies: self.strategy_names(),
        }
    }

    /// Human-readable success/failure counts per strategy
    pub fn report(&self) -> String {
        let records = self.history.snapshot();
        if records.is_empty() {
            return "No recovery records".to_string();
        }

        let stats = self.stats();
        let rule = "=".repeat(70);
        let mut lines = vec![
            String::new(),
            rule.clone(),
            "  Recovery report".to_string(),
            rule.clone(),
            format!(
                "  attempts: {}  succeeded: {}  failed: {}",
                stats.total_attempts, stats.success, stats.fail
            ),
        ];
        for name in &stats.strategies {
            let ran: Vec<&RecoveryRecord> =
                records.iter().filter(|r| &r.strategy_name == name).collect();
            if ran.is_empty() {
                continue;
            }
            let ok = ran.iter().filter(|r| r.success).count();
            lines.push(format!("  {:<20} {} ok / {} failed", name, ok, ran.len() - ok));
        }
        lines.push(rule);
        lines.join("\n")
    }

    fn record(&self, name: &str, success: bool, detail: String) {
        self.history.append(RecoveryRecord {
            strategy_name: name.to_string(),
            success,
            timestamp: Utc::now(),
            detail,
        });
    }
}

impl Default for RecoveryManager {
    fn default() -> Self {
        Self::new(RecoveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use resilience_core_types::fake::FakeDevice;
    use resilience_core_types::DeviceError;
    use std::sync::atomic::AtomicUsize;

    /// Returns a fixed outcome and counts its invocations
    struct Scripted {
        outcome: Result<bool, DeviceError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(outcome: Result<bool, DeviceError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecoveryStrategy for Scripted {
        async fn recover(&self, _device: &dyn Device) -> Result<bool, DeviceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn test_register_validation() {
        let manager = RecoveryManager::default();
        assert_eq!(
            manager.register("", 10, Scripted::new(Ok(false))),
            Err(RecoveryError::EmptyName)
        );
        manager.register("dialog", 10, Scripted::new(Ok(false))).unwrap();
        assert_eq!(
            manager.register("dialog", 20, Scripted::new(Ok(false))),
            Err(RecoveryError::Duplicate("dialog".into()))
        );
    }

    #[test]
    fn test_priority_then_registration_order() {
        let manager = RecoveryManager::default();
        manager.register("late", 50, Scripted::new(Ok(false))).unwrap();
        manager.register("first_tie", 20, Scripted::new(Ok(false))).unwrap();
        manager.register("early", 10, Scripted::new(Ok(false))).unwrap();
        manager.register("second_tie", 20, Scripted::new(Ok(false))).unwrap();

        assert_eq!(
            manager.strategy_names(),
            vec!["early", "first_tie", "second_tie", "late"]
        );
        assert!(manager.unregister("first_tie"));
        assert!(!manager.unregister("first_tie"));
        assert_eq!(manager.strategy_names(), vec!["early", "second_tie", "late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lower_priority_runs_first() {
        let manager = RecoveryManager::default();
        let succeeds = Scripted::new(Ok(true));
        let fails = Scripted::new(Ok(false));
        manager.register("succeeds", 20, succeeds.clone()).unwrap();
        manager.register("fails", 10, fails.clone()).unwrap();

        assert!(manager.try_recover(&FakeDevice::new()).await);

        let records = manager.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].strategy_name, "fails");
        assert!(!records[0].success);
        assert_eq!(records[1].strategy_name, "succeeds");
        assert!(records[1].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_invokes_every_strategy_per_attempt() {
        let manager = RecoveryManager::new(RecoveryConfig {
            max_attempts: 4,
            ..RecoveryConfig::default()
        });
        let strategies = [
            Scripted::new(Ok(false)),
            Scripted::new(Ok(false)),
            Scripted::new(Err(DeviceError::Session("lost".into()))),
        ];
        for (index, strategy) in strategies.iter().enumerate() {
            manager
                .register(format!("s{}", index), index as i32, strategy.clone())
                .unwrap();
        }

        assert!(!manager.try_recover(&FakeDevice::new()).await);

        assert!(strategies.iter().all(|s| s.calls() == 4));
        let stats = manager.stats();
        assert_eq!(stats.total_attempts, 12);
        assert_eq!(stats.fail, 12);
        assert_eq!(manager.records()[2].detail, "Session error: lost");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_waits_for_settle_time() {
        let manager = RecoveryManager::default();
        manager.register("ok", 10, Scripted::new(Ok(true))).unwrap();

        let started = tokio::time::Instant::now();
        assert!(manager.try_recover(&FakeDevice::new()).await);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_disabled_manager_does_nothing() {
        let manager = RecoveryManager::default();
        let strategy = Scripted::new(Ok(true));
        manager.register("ok", 10, strategy.clone()).unwrap();
        manager.set_enabled(false);

        assert!(!manager.try_recover(&FakeDevice::new()).await);
        assert_eq!(strategy.calls(), 0);
        assert!(manager.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_and_report() {
        let manager = RecoveryManager::default();
        assert_eq!(manager.report(), "No recovery records");
        manager.register("fails", 10, Scripted::new(Ok(false))).unwrap();
        manager.register("ok", 20, Scripted::new(Ok(true))).unwrap();

        manager.try_recover(&FakeDevice::new()).await;
        manager.try_recover(&FakeDevice::new()).await;

        let last = manager.history(1);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].strategy_name, "ok");

        let report = manager.report();
        assert!(report.contains("attempts: 4  succeeded: 2  failed: 2"));
        assert!(report.contains("fails"));

        manager.clear_history();
        assert_eq!(manager.stats().total_attempts, 0);
    }
}
