//! Element cache
//!
//! Resolving the same element over and over costs a driver round-trip every
//! time. The cache keeps the last resolved handle per [`Locator`]:
//! - entries older than the TTL are dropped on lookup
//! - live entries are probed (`is_displayed` / `is_enabled`) before reuse
//! - at capacity, the entry inserted first is evicted
//!
//! A cache belongs to exactly one session. Sessions running on parallel
//! threads each own their own instance, so lookups never take a lock.

use resilience_core_types::{Device, ElementHandle, Locator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default time-to-live for a cached handle
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Default maximum number of cached handles
pub const DEFAULT_CAPACITY: usize = 100;

/// Cache tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// One cached resolution
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub element: ElementHandle,
    pub locator: Locator,
    pub created_at: Instant,
    pub hit_count: u64,
    seq: u64,
}

/// Lookup counters for one cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Locator → element handle cache owned by a single session
#[derive(Debug)]
pub struct ElementCache {
    entries: HashMap<Locator, CacheEntry>,
    config: CacheConfig,
    stats: CacheStats,
    next_seq: u64,
}

impl ElementCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config: CacheConfig {
                capacity: config.capacity.max(1),
                ..config
            },
            stats: CacheStats::default(),
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Toggle caching; disabling drops every entry
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Return the cached handle if it is still fresh and live
    ///
    /// Expired or stale entries are evicted and reported as a miss. A miss is
    /// never an error: the caller resolves normally and calls [`put`].
    ///
    /// [`put`]: ElementCache::put
    pub async fn get(&mut self, locator: &Locator, device: &dyn Device) -> Option<ElementHandle> {
        if !self.config.enabled {
            return None;
        }

        let (element, created_at) = match self.entries.get(locator) {
            Some(entry) => (entry.element.clone(), entry.created_at),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if created_at.elapsed() > self.config.ttl {
            trace!("cache entry expired: {}", locator);
            self.evict(locator);
            return None;
        }

        if probe_live(device, &element).await {
            if let Some(entry) = self.entries.get_mut(locator) {
                entry.hit_count += 1;
            }
            self.stats.hits += 1;
            return Some(element);
        }

        debug!("cache entry stale: {}", locator);
        self.evict(locator);
        None
    }

    /// Store a freshly resolved handle
    pub fn put(&mut self, locator: Locator, element: ElementHandle) {
        if !self.config.enabled {
            return;
        }

        if self.entries.len() >= self.config.capacity && !self.entries.contains_key(&locator) {
            if let Some(oldest) = self.oldest_key() {
                trace!("cache full, evicting {}", oldest);
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            locator.clone(),
            CacheEntry {
                element,
                locator,
                created_at: Instant::now(),
                hit_count: 0,
                seq,
            },
        );
    }

    /// Drop the entry for `locator`; returns whether one existed
    pub fn invalidate(&mut self, locator: &Locator) -> bool {
        self.entries.remove(locator).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("element cache cleared");
    }

    pub fn entry(&self, locator: &Locator) -> Option<&CacheEntry> {
        self.entries.get(locator)
    }

    pub fn contains(&self, locator: &Locator) -> bool {
        self.entries.contains_key(locator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict(&mut self, locator: &Locator) {
        self.entries.remove(locator);
        self.stats.evictions += 1;
        self.stats.misses += 1;
    }

    // Insertion-time LRU: smallest created_at, ties broken by insertion order.
    fn oldest_key(&self) -> Option<Locator> {
        self.entries
            .values()
            .min_by_key(|entry| (entry.created_at, entry.seq))
            .map(|entry| entry.locator.clone())
    }
}

impl Default for ElementCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Any probe error, or an element neither displayed nor enabled, is stale
async fn probe_live(device: &dyn Device, element: &ElementHandle) -> bool {
    match device.is_displayed(element).await {
        Ok(true) => true,
        Ok(false) => matches!(device.is_enabled(element).await, Ok(true)),
        Err(_) => false,
    }
}
