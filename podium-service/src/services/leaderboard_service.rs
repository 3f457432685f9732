//! Leaderboard Service
//!
//! Validates leaderboard requests, serves them from the per-timespan cache
//! or by walking the bucket's sorted pages, and fans score writes out to
//! every live bucket.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use podium_core::{
    current_bucket_identities, BucketId, BucketIdentities, Clock, LeaderboardQuery,
    LeaderboardRequest, LeaderboardResponse, PlayerId, PodiumResult, Score, ScoreEntry,
    StoreError, SystemClock,
};
use podium_storage::{CacheEntry, LeaderboardCache, OrderedScoreStore, ScoreProvider};
use tokio::task::JoinHandle;

use crate::config::LeaderboardConfig;

// ============================================================================
// UPDATE REPORT
// ============================================================================

/// Outcome of one bucket write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWrite {
    pub bucket: BucketId,
    pub result: Result<(), StoreError>,
}

/// What an update did, bucket by bucket.
///
/// The four writes are independent; any subset may have failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub player_id: PlayerId,
    pub score: Score,
    pub writes: Vec<BucketWrite>,
}

impl UpdateReport {
    /// True when every bucket write succeeded.
    pub fn is_complete(&self) -> bool {
        self.writes.iter().all(|w| w.result.is_ok())
    }

    pub fn written(&self) -> impl Iterator<Item = &BucketId> {
        self.writes
            .iter()
            .filter(|w| w.result.is_ok())
            .map(|w| &w.bucket)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StoreError> {
        self.writes.iter().filter_map(|w| w.result.as_ref().err())
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Leaderboard read/write service.
///
/// All collaborators are injected so tests can substitute fakes; cloning is
/// cheap and shares the store, cache and clock.
pub struct LeaderboardService<S, C = SystemClock>
where
    S: OrderedScoreStore,
    C: Clock,
{
    store: Arc<S>,
    cache: Arc<LeaderboardCache>,
    clock: Arc<C>,
    config: LeaderboardConfig,
}

impl<S, C> Clone for LeaderboardService<S, C>
where
    S: OrderedScoreStore,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S, C> LeaderboardService<S, C>
where
    S: OrderedScoreStore + 'static,
    C: Clock + 'static,
{
    /// Create a service. Fails if `config` does not validate.
    pub fn new(
        store: Arc<S>,
        cache: Arc<LeaderboardCache>,
        clock: Arc<C>,
        config: LeaderboardConfig,
    ) -> PodiumResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            cache,
            clock,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &LeaderboardCache {
        &self.cache
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// The four buckets that are live right now.
    pub fn bucket_identities(&self) -> BucketIdentities {
        current_bucket_identities(&self.config.store_name, self.clock.now())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Validate `request` and return the matching leaderboard.
    ///
    /// An invalid request fails before the cache or the store is touched.
    pub async fn request_leaderboard(
        &self,
        request: &LeaderboardRequest,
    ) -> PodiumResult<LeaderboardResponse> {
        let query = request.validate().map_err(|e| {
            tracing::debug!(error = %e, "Rejected leaderboard request");
            e
        })?;
        self.get_leaderboard(query).await
    }

    /// Same as [`request_leaderboard`](Self::request_leaderboard) for a raw
    /// JSON payload.
    pub async fn request_leaderboard_json(
        &self,
        payload: &serde_json::Value,
    ) -> PodiumResult<LeaderboardResponse> {
        let request = LeaderboardRequest::from_json(payload)?;
        self.request_leaderboard(&request).await
    }

    /// Serve `query` from the cache when the reuse policy allows it,
    /// otherwise recompute from the store and refresh the cache.
    pub async fn get_leaderboard(
        &self,
        query: LeaderboardQuery,
    ) -> PodiumResult<LeaderboardResponse> {
        let timespan = query.timespan();
        let num_players = query.num_players();
        let now = self.clock.now();
        let buckets = current_bucket_identities(&self.config.store_name, now);
        let bucket = buckets.get(timespan);

        if let Some(cached) =
            self.cache
                .lookup(timespan, num_players, now, self.config.cache_policy)
        {
            tracing::debug!(
                timespan = %timespan,
                rows = cached.len(),
                "Serving cached leaderboard"
            );
            return Ok(cached);
        }

        let scores = self
            .aggregate(bucket, num_players)
            .await
            .map_err(|e| {
                tracing::warn!(bucket = %bucket, error = %e, "Leaderboard recompute failed");
                e
            })?;

        let leaderboard = LeaderboardResponse::new(scores);
        self.cache.put(
            timespan,
            CacheEntry::new(self.clock.now(), leaderboard.clone()),
        );

        tracing::debug!(
            bucket = %bucket,
            requested = num_players,
            rows = leaderboard.len(),
            "Recomputed leaderboard"
        );
        Ok(leaderboard)
    }

    /// Walk `bucket` in descending order until `num_players` rows are
    /// collected or the pages run out.
    async fn aggregate(
        &self,
        bucket: &BucketId,
        num_players: usize,
    ) -> Result<Vec<ScoreEntry>, StoreError> {
        let mut pages = self
            .bounded(
                bucket,
                self.store
                    .get_sorted_pages(bucket, true, self.config.page_size),
            )
            .await?;

        let mut scores = Vec::with_capacity(num_players.min(self.config.page_size));
        loop {
            for entry in pages.current_page() {
                if scores.len() >= num_players {
                    break;
                }
                let player_id =
                    entry
                        .key
                        .parse::<PlayerId>()
                        .map_err(|_| StoreError::MalformedEntry {
                            bucket: bucket.clone(),
                            key: entry.key.clone(),
                        })?;
                scores.push(ScoreEntry {
                    player_id,
                    score: entry.value,
                });
            }

            if scores.len() >= num_players || pages.is_finished() {
                break;
            }
            self.bounded(bucket, pages.advance_to_next_page()).await?;
        }

        Ok(scores)
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Fetch the player's score from `provider` and write it to all four
    /// live buckets.
    ///
    /// A provider failure aborts before any write. Bucket writes run
    /// concurrently and fail independently; the report says which landed.
    pub async fn update_leaderboard<P>(
        &self,
        player_id: PlayerId,
        provider: &P,
    ) -> PodiumResult<UpdateReport>
    where
        P: ScoreProvider + ?Sized,
    {
        let buckets = self.bucket_identities();

        let score = provider.get_score(player_id).await.map_err(|e| {
            tracing::warn!(%player_id, error = %e, "Score provider failed");
            e
        })?;
        tracing::info!(%player_id, score, "Retrieved score for player from provider");

        let key = player_id.store_key();
        let writes: Vec<_> = buckets
            .iter()
            .map(|bucket| self.write_bucket(bucket, player_id, &key, score))
            .collect();
        let writes = join_all(writes).await;

        Ok(UpdateReport {
            player_id,
            score,
            writes,
        })
    }

    async fn write_bucket(
        &self,
        bucket: &BucketId,
        player_id: PlayerId,
        key: &str,
        score: Score,
    ) -> BucketWrite {
        let result = self
            .bounded(bucket, self.store.set_entry(bucket, key, score))
            .await;
        if let Err(e) = &result {
            tracing::warn!(%player_id, bucket = %bucket, error = %e, "Bucket write failed");
        }
        BucketWrite {
            bucket: bucket.clone(),
            result,
        }
    }

    /// Run [`update_leaderboard`](Self::update_leaderboard) on the runtime
    /// without waiting for it. Failures are logged; the handle can still be
    /// awaited for the report.
    pub fn spawn_update<P>(
        &self,
        player_id: PlayerId,
        provider: Arc<P>,
    ) -> JoinHandle<PodiumResult<UpdateReport>>
    where
        P: ScoreProvider + ?Sized + 'static,
    {
        let service = self.clone();
        tokio::spawn(async move {
            let result = service
                .update_leaderboard(player_id, provider.as_ref())
                .await;
            match &result {
                Ok(report) if !report.is_complete() => {
                    tracing::warn!(
                        %player_id,
                        failed = report.failures().count(),
                        "Leaderboard update partially applied"
                    );
                }
                Err(e) => {
                    tracing::warn!(%player_id, error = %e, "Leaderboard update failed");
                }
                Ok(_) => {}
            }
            result
        })
    }

    /// Apply the configured store timeout to one store call.
    async fn bounded<T, F>(&self, bucket: &BucketId, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.config.store_timeout {
            Some(after) => tokio::time::timeout(after, call)
                .await
                .map_err(|_| StoreError::Timeout {
                    bucket: bucket.clone(),
                    after,
                })?,
            None => call.await,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
