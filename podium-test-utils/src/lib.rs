//! Podium Test Utilities
//!
//! Centralized test infrastructure for the Podium workspace:
//! - A manually driven clock
//! - Stub score providers
//! - Proptest generators for requests, scores and bucket contents
//! - Fixtures and assertions for common leaderboard scenarios

// Re-export the in-memory store from its source crate
pub use podium_storage::{InMemoryOrderedStore, LeaderboardCache, ScoreProvider};

// Re-export core types for convenience
pub use podium_core::{
    current_bucket_identities, BucketId, BucketIdentities, Clock, ErrorKind, LeaderboardQuery,
    LeaderboardRequest, LeaderboardResponse, PlayerId, PodiumError, PodiumResult,
    ProviderError, Score, ScoreEntry, StoreError, Timespan, ValidationError, DEFAULT_STORE_NAME,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

// ============================================================================
// MANUAL CLOCK
// ============================================================================

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let ms = i64::try_from(by.as_millis()).expect("advance fits in i64 millis");
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(fixtures::reference_instant())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .expect("manual clock holds a valid timestamp")
    }
}

// ============================================================================
// STUB PROVIDERS
// ============================================================================

/// Provider that always returns the same score and counts calls.
#[derive(Debug)]
pub struct FixedScoreProvider {
    score: Score,
    calls: AtomicU64,
}

impl FixedScoreProvider {
    pub fn new(score: Score) -> Self {
        Self {
            score,
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreProvider for FixedScoreProvider {
    async fn get_score(&self, _player_id: PlayerId) -> Result<Score, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.score)
    }
}

/// Provider that always fails.
#[derive(Debug, Clone)]
pub struct FailingScoreProvider {
    reason: String,
}

impl FailingScoreProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingScoreProvider {
    fn default() -> Self {
        Self::new("provider offline")
    }
}

#[async_trait]
impl ScoreProvider for FailingScoreProvider {
    async fn get_score(&self, player_id: PlayerId) -> Result<Score, ProviderError> {
        Err(ProviderError::ScoreUnavailable {
            player_id,
            reason: self.reason.clone(),
        })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Podium types.

    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    pub fn arb_timespan() -> impl Strategy<Value = Timespan> {
        prop_oneof![
            Just(Timespan::Daily),
            Just(Timespan::Weekly),
            Just(Timespan::Monthly),
            Just(Timespan::AllTime),
        ]
    }

    pub fn arb_player_id() -> impl Strategy<Value = PlayerId> {
        any::<i64>().prop_map(PlayerId::new)
    }

    pub fn arb_score() -> impl Strategy<Value = Score> {
        -1_000_000i64..1_000_000
    }

    /// Instants between 2000 and 2100.
    pub fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
        (946_684_800i64..4_102_444_800).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .expect("seconds within range")
        })
    }

    pub fn arb_valid_request() -> impl Strategy<Value = LeaderboardRequest> {
        (arb_timespan(), 1i64..60)
            .prop_map(|(timespan, n)| LeaderboardRequest::new(timespan.as_str(), n))
    }

    /// Requests with a bad timespan, a non-positive count, or both.
    pub fn arb_invalid_request() -> impl Strategy<Value = LeaderboardRequest> {
        let bad_timespan = "[A-Za-z_]{0,10}".prop_filter("must not be a timespan", |s| {
            !["daily", "weekly", "monthly", "alltime"].contains(&s.as_str())
        });
        prop_oneof![
            (bad_timespan.clone(), 1i64..60)
                .prop_map(|(t, n)| LeaderboardRequest::new(t, n)),
            (arb_timespan(), i64::MIN..=0)
                .prop_map(|(t, n)| LeaderboardRequest::new(t.as_str(), n)),
            (bad_timespan, -10i64..=0).prop_map(|(t, n)| LeaderboardRequest::new(t, n)),
        ]
    }

    /// Bucket contents: distinct players with arbitrary scores.
    pub fn arb_bucket_contents(max_len: usize) -> impl Strategy<Value = Vec<(PlayerId, Score)>> {
        btree_map(any::<i64>(), arb_score(), 0..=max_len)
            .prop_map(|m| m.into_iter().map(|(id, s)| (PlayerId::new(id), s)).collect())
    }

    /// A run of distinct instants, as offsets in days from a base instant.
    pub fn arb_day_offsets(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
        vec(0i64..3650, 1..=max_len)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Ready-made values for common scenarios.

    use super::*;

    /// 2026-10-16 12:00:00 UTC (day 289, week 41, month 10).
    pub fn reference_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    pub fn buckets_at(at: DateTime<Utc>) -> BucketIdentities {
        current_bucket_identities(DEFAULT_STORE_NAME, at)
    }

    /// Seed `count` players with strictly decreasing scores into `bucket`.
    ///
    /// Player `i` (1-based) gets score `1000 - i`, so the expected descending
    /// order is player 1, 2, 3, ...
    pub fn seed_descending(store: &InMemoryOrderedStore, bucket: &BucketId, count: i64) {
        for i in 1..=count {
            store.seed(bucket, PlayerId::new(i).store_key(), 1000 - i);
        }
    }

    /// Seed explicit `(player, score)` pairs into `bucket`.
    pub fn seed_entries(store: &InMemoryOrderedStore, bucket: &BucketId, entries: &[(PlayerId, Score)]) {
        for (player, score) in entries {
            store.seed(bucket, player.store_key(), *score);
        }
    }

    /// The top `n` of `entries` the way the store orders them.
    pub fn expected_top(entries: &[(PlayerId, Score)], n: usize) -> Vec<ScoreEntry> {
        let mut sorted: Vec<(PlayerId, Score)> = entries.to_vec();
        sorted.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.store_key().cmp(&b.0.store_key()))
        });
        sorted
            .into_iter()
            .take(n)
            .map(|(player_id, score)| ScoreEntry { player_id, score })
            .collect()
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Podium-specific assertions.

    use super::*;

    pub fn assert_kind<T: std::fmt::Debug>(result: &PodiumResult<T>, kind: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), kind, "unexpected error: {e}"),
            Ok(v) => panic!("expected {kind:?} error, got Ok({v:?})"),
        }
    }

    pub fn assert_validation_error<T: std::fmt::Debug>(result: &PodiumResult<T>) {
        assert_kind(result, ErrorKind::Validation);
    }

    pub fn assert_store_error<T: std::fmt::Debug>(result: &PodiumResult<T>) {
        assert_kind(result, ErrorKind::StoreUnavailable);
    }

    pub fn assert_provider_error<T: std::fmt::Debug>(result: &PodiumResult<T>) {
        assert_kind(result, ErrorKind::Provider);
    }

    pub fn assert_sorted_descending(response: &LeaderboardResponse) {
        assert!(
            response.is_sorted_descending(),
            "leaderboard not sorted descending: {:?}",
            response.scores
        );
    }

    /// Assert that no bucket in the store holds any entry.
    pub fn assert_store_empty(store: &InMemoryOrderedStore) {
        assert_eq!(store.bucket_count(), 0, "store has buckets: {:?}", store.buckets());
    }
}
