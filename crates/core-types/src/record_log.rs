//! Capped, append-only history shared between sessions

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default ceiling for heal and recovery histories
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Thread-safe append-only log that drops its oldest records past a ceiling
///
/// The mutex is held only for append/trim and for copying a snapshot out;
/// readers never observe a partially trimmed log.
#[derive(Debug)]
pub struct RecordLog<T> {
    records: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone> RecordLog<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn append(&self, record: T) {
        let mut records = self.records.lock();
        records.push_back(record);
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    /// Copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.records.lock().iter().cloned().collect()
    }

    /// Copy of the newest `limit` records, oldest first
    pub fn tail(&self, limit: usize) -> Vec<T> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(limit);
        records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl<T: Clone> Default for RecordLog<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
