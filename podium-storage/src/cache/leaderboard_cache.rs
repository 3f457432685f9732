//! Per-timespan leaderboard cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use podium_core::{LeaderboardResponse, Timespan};

use super::reuse::{age_since, ReusePolicy};

/// Most recent leaderboard computed for one timespan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub last_retrieval: DateTime<Utc>,
    pub leaderboard: LeaderboardResponse,
}

impl CacheEntry {
    pub fn new(last_retrieval: DateTime<Utc>, leaderboard: LeaderboardResponse) -> Self {
        Self {
            last_retrieval,
            leaderboard,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        age_since(self.last_retrieval, now)
    }
}

/// Snapshot of cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the store.
    pub misses: u64,
    /// Entries written (every successful recompute).
    pub writes: u64,
    /// Entries currently held (at most one per timespan).
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory map from timespan to its latest leaderboard.
///
/// Entries are never evicted; each successful recompute overwrites the
/// entry for its timespan. Concurrent writers race and the last one wins.
#[derive(Debug, Default)]
pub struct LeaderboardCache {
    entries: DashMap<Timespan, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, timespan: Timespan) -> Option<CacheEntry> {
        self.entries.get(&timespan).map(|entry| entry.value().clone())
    }

    pub fn put(&self, timespan: Timespan, entry: CacheEntry) {
        self.entries.insert(timespan, entry);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Return the cached leaderboard for `timespan` if `policy` lets it
    /// answer a request for `num_players` rows at `now`.
    ///
    /// Records a hit or a miss.
    pub fn lookup(
        &self,
        timespan: Timespan,
        num_players: usize,
        now: DateTime<Utc>,
        policy: ReusePolicy,
    ) -> Option<LeaderboardResponse> {
        let reusable = self.entries.get(&timespan).and_then(|entry| {
            policy
                .allows(entry.age(now), entry.leaderboard.len(), num_players)
                .then(|| entry.leaderboard.clone())
        });

        let counter = if reusable.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        reusable
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_core::{PlayerId, ScoreEntry};

    fn board(len: usize) -> LeaderboardResponse {
        LeaderboardResponse::new(
            (0..len)
                .map(|i| ScoreEntry {
                    player_id: PlayerId::new(i as i64),
                    score: (100 - i) as i64,
                })
                .collect(),
        )
    }

    #[test]
    fn test_clear_drops_entries_keeps_counters() {
        let cache = LeaderboardCache::new();
        cache.put(Timespan::Daily, CacheEntry::new(Utc::now(), board(3)));
        cache.put(Timespan::AllTime, CacheEntry::new(Utc::now(), board(3)));

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(Timespan::Daily).is_none());
        assert_eq!(cache.stats().writes, 2);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_put_overwrites_unconditionally() {
        let cache = LeaderboardCache::new();
        let now = Utc::now();
        cache.put(Timespan::Daily, CacheEntry::new(now, board(10)));
        cache.put(Timespan::Daily, CacheEntry::new(now, board(2)));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Timespan::Daily).unwrap().leaderboard.len(), 2);
        assert!(cache.get(Timespan::Weekly).is_none());
        assert_eq!(cache.stats().writes, 2);
    }

    #[test]
    fn test_at_most_one_entry_per_timespan() {
        let cache = LeaderboardCache::new();
        for _ in 0..3 {
            for timespan in Timespan::ALL {
                cache.put(timespan, CacheEntry::new(Utc::now(), board(1)));
            }
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_lookup_follows_policy_and_counts() {
        let cache = LeaderboardCache::new();
        let now = Utc::now();
        let two_minutes_ago = now - chrono::Duration::seconds(120);
        cache.put(Timespan::Monthly, CacheEntry::new(two_minutes_ago, board(10)));

        let policy = ReusePolicy::default();
        assert_eq!(
            cache.lookup(Timespan::Monthly, 10, now, policy),
            Some(board(10))
        );
        assert_eq!(cache.lookup(Timespan::Monthly, 11, now, policy), None);
        assert_eq!(cache.lookup(Timespan::Daily, 1, now, policy), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_fresh_entry_is_recomputed_under_default_policy() {
        let cache = LeaderboardCache::new();
        let now = Utc::now();
        cache.put(Timespan::AllTime, CacheEntry::new(now, board(10)));

        assert!(cache
            .lookup(Timespan::AllTime, 5, now, ReusePolicy::default())
            .is_none());
        assert!(cache
            .lookup(
                Timespan::AllTime,
                5,
                now,
                ReusePolicy::YoungerThan(Duration::from_secs(60))
            )
            .is_some());
    }

    #[test]
    fn test_empty_stats_hit_rate() {
        let stats = CacheStats::default();
        assert!((stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
