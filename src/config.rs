//! Pipeline configuration
//!
//! Values are resolved once, when the pipeline is built:
//! defaults, then an optional JSON or YAML file, then `RESILIENCE_*`
//! environment variables. The result is validated before use.

use crate::errors::ResilienceError;
use action_primitives::WaitOptions;
use action_recovery::RecoveryConfig;
use element_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "RESILIENCE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub enabled: bool,
    pub ttl_ms: u64,
    pub capacity: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: 30_000,
            capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSection {
    /// How long an action waits for its element to appear
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ActionSection {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingSection {
    pub enabled: bool,
    /// Wait for the original locator before candidates are tried
    pub timeout_ms: u64,
    pub history_capacity: usize,
    pub max_candidates: usize,
}

impl Default for HealingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 2_000,
            history_capacity: 500,
            max_candidates: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    pub enabled: bool,
    pub max_attempts: u32,
    pub max_recovery_retries: u32,
    pub settle_ms: u64,
    pub history_capacity: usize,
    pub recover_locator_misses: bool,
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            max_recovery_retries: 1,
            settle_ms: 1_000,
            history_capacity: 500,
            recover_locator_misses: false,
        }
    }
}

/// Plain retries around the resilience middleware; off by default
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_retries: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    pub warn_threshold_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            warn_threshold_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub cache: CacheSection,
    pub action: ActionSection,
    pub healing: HealingSection,
    pub recovery: RecoverySection,
    pub retry: RetrySection,
    pub timing: TimingSection,
}

impl ResilienceConfig {
    /// Defaults, optional file, environment overrides, validation
    pub fn load(path: Option<&Path>) -> Result<Self, ResilienceError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a file; `.yaml` / `.yml` are read as YAML, anything else as JSON
    pub fn from_file(path: &Path) -> Result<Self, ResilienceError> {
        let content = std::fs::read_to_string(path).map_err(|source| ResilienceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        debug!(path = %path.display(), yaml = is_yaml, "loading configuration file");

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Apply `RESILIENCE_<SECTION>_<FIELD>` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ResilienceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader {
            lookup: &lookup,
        };

        env.set("CACHE_ENABLED", &mut self.cache.enabled)?;
        env.set("CACHE_TTL_MS", &mut self.cache.ttl_ms)?;
        env.set("CACHE_CAPACITY", &mut self.cache.capacity)?;

        env.set("ACTION_TIMEOUT_MS", &mut self.action.timeout_ms)?;
        env.set("ACTION_POLL_INTERVAL_MS", &mut self.action.poll_interval_ms)?;

        env.set("HEALING_ENABLED", &mut self.healing.enabled)?;
        env.set("HEALING_TIMEOUT_MS", &mut self.healing.timeout_ms)?;
        env.set("HEALING_HISTORY_CAPACITY", &mut self.healing.history_capacity)?;
        env.set("HEALING_MAX_CANDIDATES", &mut self.healing.max_candidates)?;

        env.set("RECOVERY_ENABLED", &mut self.recovery.enabled)?;
        env.set("RECOVERY_MAX_ATTEMPTS", &mut self.recovery.max_attempts)?;
        env.set(
            "RECOVERY_MAX_RECOVERY_RETRIES",
            &mut self.recovery.max_recovery_retries,
        )?;
        env.set("RECOVERY_SETTLE_MS", &mut self.recovery.settle_ms)?;
        env.set("RECOVERY_HISTORY_CAPACITY", &mut self.recovery.history_capacity)?;
        env.set(
            "RECOVERY_RECOVER_LOCATOR_MISSES",
            &mut self.recovery.recover_locator_misses,
        )?;

        env.set("RETRY_MAX_RETRIES", &mut self.retry.max_retries)?;
        env.set("RETRY_DELAY_MS", &mut self.retry.delay_ms)?;

        env.set("TIMING_WARN_THRESHOLD_MS", &mut self.timing.warn_threshold_ms)?;
        Ok(())
    }

    /// Reject values that would make waits or histories degenerate
    pub fn validate(&self) -> Result<(), ResilienceError> {
        let checks = [
            ("cache.ttl_ms", self.cache.ttl_ms == 0),
            ("cache.capacity", self.cache.capacity == 0),
            ("action.timeout_ms", self.action.timeout_ms == 0),
            ("action.poll_interval_ms", self.action.poll_interval_ms == 0),
            ("healing.timeout_ms", self.healing.timeout_ms == 0),
            ("healing.history_capacity", self.healing.history_capacity == 0),
            ("healing.max_candidates", self.healing.max_candidates == 0),
            ("recovery.max_attempts", self.recovery.max_attempts == 0),
            ("recovery.history_capacity", self.recovery.history_capacity == 0),
        ];
        match checks.iter().find(|(_, zero)| *zero) {
            Some((field, _)) => Err(ResilienceError::Validation(format!(
                "{} must be greater than zero",
                field
            ))),
            None => Ok(()),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.cache.enabled,
            ttl: Duration::from_millis(self.cache.ttl_ms),
            capacity: self.cache.capacity,
        }
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(
            Duration::from_millis(self.action.timeout_ms),
            Duration::from_millis(self.action.poll_interval_ms),
        )
    }

    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig {
            enabled: self.recovery.enabled,
            max_attempts: self.recovery.max_attempts,
            settle_time: Duration::from_millis(self.recovery.settle_ms),
            history_capacity: self.recovery.history_capacity,
        }
    }
}

struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl EnvReader<'_> {
    fn set<T: FromStr>(&self, suffix: &str, target: &mut T) -> Result<(), ResilienceError> {
        let key = format!("{}{}", ENV_PREFIX, suffix);
        let Some(raw) = (self.lookup)(&key) else {
            return Ok(());
        };
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ResilienceError::InvalidEnv { key, value: raw })?;
        Ok(())
    }
}
