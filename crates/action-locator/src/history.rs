//! Record of successful heals

use chrono::{DateTime, Utc};
use resilience_core_types::{Locator, RecordLog, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};

/// One successful heal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealRecord {
    pub original_locator: Locator,
    pub healed_locator: Locator,
    /// Name of the heuristic that produced the working locator
    pub strategy: String,
    /// Screen the heal happened on (current activity), empty if unknown
    pub page_context: String,
    pub timestamp: DateTime<Utc>,
}

impl HealRecord {
    /// Suggested fix for the broken locator
    pub fn suggestion(&self) -> String {
        format!(
            "Update locator to {}  # strategy: {}",
            self.healed_locator, self.strategy
        )
    }
}

/// Capped, shared heal history; oldest records are dropped first
#[derive(Debug)]
pub struct HealHistory {
    records: RecordLog<HealRecord>,
}

impl HealHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RecordLog::new(capacity),
        }
    }

    pub fn append(&self, record: HealRecord) {
        self.records.append(record);
    }

    pub fn records(&self) -> Vec<HealRecord> {
        self.records.snapshot()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    /// Human-readable list of locator fixes
    pub fn report(&self) -> String {
        let records = self.records.snapshot();
        if records.is_empty() {
            return "No self-healing records".to_string();
        }

        let rule = "=".repeat(70);
        let mut lines = vec![String::new(), rule.clone(), "  Locator self-healing report".to_string(), rule.clone()];
        for (index, record) in records.iter().enumerate() {
            lines.push(format!("\n  [{}] {}", index + 1, record.strategy));
            lines.push(format!("      original: {}", record.original_locator));
            lines.push(format!("      healed:   {}", record.healed_locator));
            if !record.page_context.is_empty() {
                lines.push(format!("      screen:   {}", record.page_context));
            }
            lines.push(format!("      {}", record.suggestion()));
        }
        lines.push(rule);
        lines.join("\n")
    }
}

impl Default for HealHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
