//! Time-bucketed store partitions.
//!
//! Every timespan maps to one partition of the ordered score store. The
//! partition name is the timespan name followed by the calendar period the
//! timestamp falls into, so partitions roll over on their own when the
//! period changes. `alltime` has a single constant partition.

use crate::Timespan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default data store name that all leaderboard buckets live under.
pub const DEFAULT_STORE_NAME: &str = "leaderboard";

/// Identity of one store partition: `(store name, timespan, period)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketId {
    store: String,
    timespan: Timespan,
    period: Option<String>,
}

impl BucketId {
    pub fn new(store: impl Into<String>, timespan: Timespan, period: Option<String>) -> Self {
        Self {
            store: store.into(),
            timespan,
            period,
        }
    }

    /// A partition without a calendar period.
    pub fn constant(store: impl Into<String>, timespan: Timespan) -> Self {
        Self::new(store, timespan, None)
    }

    /// The partition `timespan` resolves to at instant `at`.
    pub fn at(store: impl Into<String>, timespan: Timespan, at: DateTime<Utc>) -> Self {
        Self::new(store, timespan, period_label(timespan, at))
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn timespan(&self) -> Timespan {
        self.timespan
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }

    /// Partition name inside the store, e.g. `daily289/2026` or `alltime`.
    pub fn scope(&self) -> String {
        match &self.period {
            Some(period) => format!("{}{}", self.timespan.as_str(), period),
            None => self.timespan.as_str().to_string(),
        }
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.store, self.scope())
    }
}

/// Calendar period label for a timespan.
///
/// - daily: day-of-year / year (`%j/%Y`)
/// - weekly: Monday-based week-of-year / year (`%W/%Y`)
/// - monthly: month / year (`%m/%Y`)
/// - alltime: none
pub fn period_label(timespan: Timespan, at: DateTime<Utc>) -> Option<String> {
    let pattern = match timespan {
        Timespan::Daily => "%j/%Y",
        Timespan::Weekly => "%W/%Y",
        Timespan::Monthly => "%m/%Y",
        Timespan::AllTime => return None,
    };
    Some(at.format(pattern).to_string())
}

/// The four partitions that are live at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketIdentities {
    pub daily: BucketId,
    pub weekly: BucketId,
    pub monthly: BucketId,
    pub alltime: BucketId,
}

impl BucketIdentities {
    pub fn get(&self, timespan: Timespan) -> &BucketId {
        match timespan {
            Timespan::Daily => &self.daily,
            Timespan::Weekly => &self.weekly,
            Timespan::Monthly => &self.monthly,
            Timespan::AllTime => &self.alltime,
        }
    }

    /// Iterate in `Timespan::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = &BucketId> {
        Timespan::ALL.into_iter().map(move |timespan| self.get(timespan))
    }
}

/// Compute the partitions for all four timespans at `now`.
///
/// Shared by the read path and the write path so both always agree on
/// which partition a timespan currently resolves to.
pub fn current_bucket_identities(store: &str, now: DateTime<Utc>) -> BucketIdentities {
    BucketIdentities {
        daily: BucketId::at(store, Timespan::Daily, now),
        weekly: BucketId::at(store, Timespan::Weekly, now),
        monthly: BucketId::at(store, Timespan::Monthly, now),
        alltime: BucketId::at(store, Timespan::AllTime, now),
    }
}
