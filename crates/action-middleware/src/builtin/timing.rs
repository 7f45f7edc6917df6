use crate::chain::{Middleware, Next};
use crate::context::ActionContext;
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionKind, ActionOutput, RecordLog, DEFAULT_HISTORY_CAPACITY};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

const SLOWEST_IN_REPORT: usize = 5;

/// Duration of one action as seen from the timing middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingRecord {
    pub action: ActionKind,
    pub locator: String,
    pub elapsed_ms: u64,
    pub success: bool,
}

/// Aggregate over the recorded timings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingReport {
    pub total: usize,
    pub avg_ms: f64,
    pub max_ms: u64,
    pub slowest: Vec<TimingRecord>,
}

/// Measures every action and warns when one exceeds `warn_threshold`
pub struct TimingMiddleware {
    warn_threshold: Duration,
    records: RecordLog<TimingRecord>,
}

impl TimingMiddleware {
    pub fn new(warn_threshold: Duration) -> Self {
        Self::with_capacity(warn_threshold, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(warn_threshold: Duration, capacity: usize) -> Self {
        Self {
            warn_threshold,
            records: RecordLog::new(capacity),
        }
    }

    pub fn records(&self) -> Vec<TimingRecord> {
        self.records.snapshot()
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    pub fn report(&self) -> TimingReport {
        let records = self.records.snapshot();
        if records.is_empty() {
            return TimingReport {
                total: 0,
                avg_ms: 0.0,
                max_ms: 0,
                slowest: Vec::new(),
            };
        }

        let sum: u64 = records.iter().map(|r| r.elapsed_ms).sum();
        let max_ms = records.iter().map(|r| r.elapsed_ms).max().unwrap_or(0);
        let mut slowest = records.clone();
        // stable sort keeps earlier records first among equals
        slowest.sort_by(|a, b| b.elapsed_ms.cmp(&a.elapsed_ms));
        slowest.truncate(SLOWEST_IN_REPORT);

        TimingReport {
            total: records.len(),
            avg_ms: sum as f64 / records.len() as f64,
            max_ms,
            slowest,
        }
    }
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl Middleware for TimingMiddleware {
    fn name(&self) -> &str {
        "timing"
    }

    async fn handle(
        &self,
        ctx: &mut ActionContext<'_>,
        next: Next<'_>,
    ) -> Result<ActionOutput, ActionError> {
        let started = Instant::now();
        let result = next.run(ctx).await;
        let elapsed = started.elapsed();

        self.records.append(TimingRecord {
            action: ctx.action,
            locator: ctx.locator.to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
            success: result.is_ok(),
        });

        if elapsed > self.warn_threshold {
            warn!(
                action_id = %ctx.action_id,
                action = %ctx.action,
                locator = %ctx.locator,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.warn_threshold.as_millis() as u64,
                "Slow action"
            );
        }

        result
    }
}
