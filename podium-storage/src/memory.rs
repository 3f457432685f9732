//! In-memory ordered score store.
//!
//! Reference implementation of [`OrderedScoreStore`] used by the demo binary
//! and by tests. Cursors sort a snapshot of the bucket at open time, so
//! writes that land while a cursor is being walked are not observed by it.
//! Faults and latency can be injected to exercise the service's failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ::async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use podium_core::{BucketId, Score, StoreError, Timespan};

use crate::store::{OrderedScoreStore, SortedPages, StoreEntry};

/// Injected failure switches, shared between the store and its cursors.
#[derive(Debug, Default)]
struct StoreFaults {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_advance: AtomicBool,
    failing_write_timespans: DashSet<Timespan>,
    latency_ms: AtomicU64,
}

impl StoreFaults {
    fn latency(&self) -> Option<Duration> {
        match self.latency_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Call counters, shared between the store and its cursors.
#[derive(Debug, Default)]
struct StoreCounters {
    pages_opened: AtomicU64,
    advances: AtomicU64,
    writes: AtomicU64,
}

/// In-memory store with one `HashMap` per bucket.
#[derive(Debug, Default)]
pub struct InMemoryOrderedStore {
    buckets: DashMap<BucketId, HashMap<String, Score>>,
    faults: Arc<StoreFaults>,
    counters: Arc<StoreCounters>,
}

impl InMemoryOrderedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert directly, bypassing faults, latency and counters.
    pub fn seed(&self, bucket: &BucketId, key: impl Into<String>, value: Score) {
        self.buckets
            .entry(bucket.clone())
            .or_default()
            .insert(key.into(), value);
    }

    /// Drop every bucket. Faults and counters are kept.
    pub fn clear(&self) {
        self.buckets.clear();
    }

    pub fn entry(&self, bucket: &BucketId, key: &str) -> Option<Score> {
        self.buckets
            .get(bucket)
            .and_then(|entries| entries.get(key).copied())
    }

    pub fn entry_count(&self, bucket: &BucketId) -> usize {
        self.buckets.get(bucket).map(|e| e.len()).unwrap_or(0)
    }

    /// Number of buckets that have received at least one entry.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn buckets(&self) -> Vec<BucketId> {
        self.buckets.iter().map(|e| e.key().clone()).collect()
    }

    // === Fault injection ===

    /// Make `get_sorted_pages` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.faults.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every `set_entry` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make `set_entry` fail only for buckets of `timespan`.
    pub fn fail_writes_for(&self, timespan: Timespan) {
        self.faults.failing_write_timespans.insert(timespan);
    }

    /// Make cursor page advances fail.
    pub fn set_fail_advance(&self, fail: bool) {
        self.faults.fail_advance.store(fail, Ordering::Relaxed);
    }

    /// Delay every store call by `latency` (zero disables).
    pub fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.faults.latency_ms.store(ms, Ordering::Relaxed);
    }

    pub fn reset_faults(&self) {
        self.set_fail_reads(false);
        self.set_fail_writes(false);
        self.set_fail_advance(false);
        self.faults.failing_write_timespans.clear();
        self.set_latency(Duration::ZERO);
    }

    // === Counters ===

    /// Cursors successfully opened.
    pub fn pages_opened(&self) -> u64 {
        self.counters.pages_opened.load(Ordering::Relaxed)
    }

    /// Successful page advances across all cursors.
    pub fn advances(&self) -> u64 {
        self.counters.advances.load(Ordering::Relaxed)
    }

    /// Successful writes.
    pub fn writes(&self) -> u64 {
        self.counters.writes.load(Ordering::Relaxed)
    }

    fn sorted_snapshot(&self, bucket: &BucketId, descending: bool) -> Vec<StoreEntry> {
        let mut entries: Vec<StoreEntry> = self
            .buckets
            .get(bucket)
            .map(|map| {
                map.iter()
                    .map(|(key, value)| StoreEntry::new(key.clone(), *value))
                    .collect()
            })
            .unwrap_or_default();

        entries.sort_by(|a, b| {
            let by_value = if descending {
                b.value.cmp(&a.value)
            } else {
                a.value.cmp(&b.value)
            };
            by_value.then_with(|| a.key.cmp(&b.key))
        });
        entries
    }
}

#[async_trait]
impl OrderedScoreStore for InMemoryOrderedStore {
    async fn set_entry(
        &self,
        bucket: &BucketId,
        key: &str,
        value: Score,
    ) -> Result<(), StoreError> {
        self.faults.delay().await;

        if self.faults.fail_writes.load(Ordering::Relaxed)
            || self
                .faults
                .failing_write_timespans
                .contains(&bucket.timespan())
        {
            return Err(StoreError::unavailable(bucket, "write rejected"));
        }

        self.seed(bucket, key, value);
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn get_sorted_pages(
        &self,
        bucket: &BucketId,
        descending: bool,
        page_size: usize,
    ) -> Result<Box<dyn SortedPages>, StoreError> {
        self.faults.delay().await;

        if self.faults.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::unavailable(bucket, "read rejected"));
        }
        if page_size == 0 {
            return Err(StoreError::unavailable(bucket, "page size must be positive"));
        }

        let entries = self.sorted_snapshot(bucket, descending);
        self.counters.pages_opened.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(InMemoryPages {
            bucket: bucket.clone(),
            entries,
            page_size,
            offset: 0,
            faults: Arc::clone(&self.faults),
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// Cursor over a sorted snapshot of one bucket.
#[derive(Debug)]
pub struct InMemoryPages {
    bucket: BucketId,
    entries: Vec<StoreEntry>,
    page_size: usize,
    offset: usize,
    faults: Arc<StoreFaults>,
    counters: Arc<StoreCounters>,
}

#[async_trait]
impl SortedPages for InMemoryPages {
    fn current_page(&self) -> &[StoreEntry] {
        let start = self.offset.min(self.entries.len());
        let end = (self.offset + self.page_size).min(self.entries.len());
        &self.entries[start..end]
    }

    fn is_finished(&self) -> bool {
        self.offset + self.page_size >= self.entries.len()
    }

    async fn advance_to_next_page(&mut self) -> Result<(), StoreError> {
        self.faults.delay().await;

        if self.faults.fail_advance.load(Ordering::Relaxed) {
            return Err(StoreError::unavailable(&self.bucket, "page advance rejected"));
        }
        if self.is_finished() {
            return Err(StoreError::unavailable(&self.bucket, "no more pages"));
        }

        self.offset += self.page_size;
        self.counters.advances.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
