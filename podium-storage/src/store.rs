//! Async capability traits for the ordered score store.
//!
//! The store is external and eventually consistent. It is partitioned into
//! buckets, and each bucket can hand back its entries sorted by value, one
//! fixed-size page at a time. Every call may suspend and every call may fail.

use ::async_trait::async_trait;
use podium_core::{BucketId, Score, StoreError};
use serde::{Deserialize, Serialize};

/// One `{key, value}` pair as the store yields it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub key: String,
    pub value: Score,
}

impl StoreEntry {
    pub fn new(key: impl Into<String>, value: Score) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Paginated cursor over a sorted bucket.
///
/// A freshly opened cursor is already positioned on its first page.
#[async_trait]
pub trait SortedPages: Send {
    /// Entries on the current page, in sort order.
    fn current_page(&self) -> &[StoreEntry];

    /// True when the current page is the last one.
    fn is_finished(&self) -> bool;

    /// Move to the next page.
    async fn advance_to_next_page(&mut self) -> Result<(), StoreError>;
}

/// Ordered key/value store, one partition per bucket.
#[async_trait]
pub trait OrderedScoreStore: Send + Sync {
    /// Set `key` to `value` inside `bucket`, overwriting any previous value.
    async fn set_entry(&self, bucket: &BucketId, key: &str, value: Score)
        -> Result<(), StoreError>;

    /// Open a sorted cursor over `bucket`.
    async fn get_sorted_pages(
        &self,
        bucket: &BucketId,
        descending: bool,
        page_size: usize,
    ) -> Result<Box<dyn SortedPages>, StoreError>;
}
