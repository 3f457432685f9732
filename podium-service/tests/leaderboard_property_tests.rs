//! Property-Based Tests for the Leaderboard Service
//!
//! **Property 1: Bounded, ordered reads**
//! For any bucket contents and any valid request, the response holds at most
//! `numPlayers` rows, is sorted by descending score, and equals the store's
//! own top-N.
//!
//! **Property 2: Validation short-circuits**
//! For any invalid request, the service fails with a validation error and
//! neither the store nor the cache is touched.
//!
//! **Property 3: Update fan-out**
//! For any player, score and instant, a successful update writes the score
//! to exactly the four buckets live at that instant.

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use podium_core::{BucketId, ErrorKind, PlayerId, Timespan};
use podium_service::{LeaderboardConfig, LeaderboardService};
use podium_storage::{InMemoryOrderedStore, LeaderboardCache, ReusePolicy};
use podium_test_utils::{fixtures, generators::*, FixedScoreProvider, ManualClock};
use proptest::prelude::*;
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

type TestService = LeaderboardService<InMemoryOrderedStore, ManualClock>;

fn test_service(
    config: LeaderboardConfig,
) -> Result<(Arc<InMemoryOrderedStore>, Arc<ManualClock>, TestService), TestCaseError> {
    let store = Arc::new(InMemoryOrderedStore::new());
    let clock = Arc::new(ManualClock::default());
    let service = LeaderboardService::new(
        Arc::clone(&store),
        Arc::new(LeaderboardCache::new()),
        Arc::clone(&clock),
        config,
    )
    .map_err(|e| TestCaseError::fail(format!("Failed to build service: {}", e)))?;
    Ok((store, clock, service))
}

/// Page sizes small enough that most cases span several pages.
fn page_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(10usize), 1usize..7]
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// **Property 1: Bounded, ordered reads**
    #[test]
    fn prop_response_is_store_top_n(
        contents in arb_bucket_contents(45),
        request in arb_valid_request(),
        page_size in page_size_strategy(),
    ) {
        let rt = test_runtime()?;
        let config = LeaderboardConfig::default()
            .with_page_size(page_size)
            .with_cache_policy(ReusePolicy::Never);
        let (store, _clock, service) = test_service(config)?;

        let query = request.validate()
            .map_err(|e| TestCaseError::fail(format!("generator produced invalid request: {}", e)))?;
        let bucket = service.bucket_identities().get(query.timespan()).clone();
        fixtures::seed_entries(&store, &bucket, &contents);

        let response = rt.block_on(service.request_leaderboard(&request))
            .map_err(|e| TestCaseError::fail(format!("request failed: {}", e)))?;

        prop_assert!(response.len() <= query.num_players());
        prop_assert!(response.is_sorted_descending());
        prop_assert_eq!(response.scores, fixtures::expected_top(&contents, query.num_players()));

        // Pages are only advanced while rows are still needed.
        let needed = query.num_players().min(contents.len());
        let pages_needed = needed.div_ceil(page_size).max(1) as u64;
        prop_assert_eq!(store.advances(), pages_needed - 1);
    }

    /// **Property 2: Validation short-circuits**
    #[test]
    fn prop_invalid_request_touches_nothing(request in arb_invalid_request()) {
        let rt = test_runtime()?;
        let (store, _clock, service) = test_service(LeaderboardConfig::default())?;

        let result = rt.block_on(service.request_leaderboard(&request));

        prop_assert_eq!(result.map_err(|e| e.kind()).err(), Some(ErrorKind::Validation));
        prop_assert_eq!(store.pages_opened(), 0);
        prop_assert!(service.cache().is_empty());
        prop_assert_eq!(service.cache().stats().misses, 0);
    }

    /// **Property 3: Update fan-out**
    #[test]
    fn prop_update_writes_live_buckets(
        player in arb_player_id(),
        score in arb_score(),
        at in arb_instant(),
    ) {
        let rt = test_runtime()?;
        let (store, clock, service) = test_service(LeaderboardConfig::default())?;
        clock.set(at);

        let report = rt.block_on(service.update_leaderboard(player, &FixedScoreProvider::new(score)))
            .map_err(|e| TestCaseError::fail(format!("update failed: {}", e)))?;

        prop_assert!(report.is_complete());
        let expected: Vec<BucketId> = fixtures::buckets_at(at).iter().cloned().collect();
        let written: Vec<BucketId> = report.written().cloned().collect();
        prop_assert_eq!(&written, &expected);

        let mut stored = store.buckets();
        stored.sort_by_key(|b| b.scope());
        let mut expected_sorted = expected.clone();
        expected_sorted.sort_by_key(|b| b.scope());
        prop_assert_eq!(stored, expected_sorted);

        for bucket in &expected {
            prop_assert_eq!(store.entry(bucket, &player.store_key()), Some(score));
        }
    }

    /// Updates on different days land in different daily buckets but the
    /// same all-time bucket.
    #[test]
    fn prop_daily_buckets_partition_by_day(offsets in arb_day_offsets(6)) {
        let rt = test_runtime()?;
        let (store, clock, service) = test_service(LeaderboardConfig::default())?;
        let start = fixtures::reference_instant();

        let mut days = std::collections::HashSet::new();
        for (i, offset) in offsets.iter().enumerate() {
            let at = start + ChronoDuration::days(*offset);
            clock.set(at);
            days.insert(fixtures::buckets_at(at).daily);
            rt.block_on(service.update_leaderboard(
                PlayerId::new(i as i64 + 1),
                &FixedScoreProvider::new(1),
            ))
            .map_err(|e| TestCaseError::fail(format!("update failed: {}", e)))?;
        }

        let daily_buckets = store
            .buckets()
            .into_iter()
            .filter(|b| b.timespan() == Timespan::Daily)
            .count();
        prop_assert_eq!(daily_buckets, days.len());

        let alltime = fixtures::buckets_at(start).alltime;
        prop_assert_eq!(store.entry_count(&alltime), offsets.len());
    }
}
