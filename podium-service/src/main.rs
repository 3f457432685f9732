//! Podium demo entry point
//!
//! Records random scores for two players against an in-memory store, waits
//! for both updates, then prints the daily top ten.

use std::sync::Arc;

use podium_core::{LeaderboardRequest, PlayerId, SystemClock};
use podium_service::{
    init_tracing, LeaderboardConfig, LeaderboardService, ServiceResult, TelemetryConfig,
};
use podium_storage::{InMemoryOrderedStore, LeaderboardCache, RandomScoreProvider};

const DEMO_PLAYERS: [i64; 2] = [64624, 14_901_247_091];

#[tokio::main]
async fn main() -> ServiceResult<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let config = LeaderboardConfig::from_env()?;
    tracing::info!(
        store_name = %config.store_name,
        page_size = config.page_size,
        cache_policy = config.cache_policy.name(),
        "Starting leaderboard demo"
    );

    let service = LeaderboardService::new(
        Arc::new(InMemoryOrderedStore::new()),
        Arc::new(LeaderboardCache::new()),
        Arc::new(SystemClock),
        config,
    )?;
    let provider = Arc::new(RandomScoreProvider::default());

    let updates: Vec<_> = DEMO_PLAYERS
        .into_iter()
        .map(|player| service.spawn_update(PlayerId::new(player), Arc::clone(&provider)))
        .collect();
    for update in updates {
        let report = update.await??;
        tracing::info!(
            player_id = %report.player_id,
            score = report.score,
            complete = report.is_complete(),
            "Score recorded"
        );
    }

    let response = service
        .request_leaderboard(&LeaderboardRequest::new("daily", 10))
        .await?;

    tracing::info!("Parsing response...");
    for entry in &response.scores {
        tracing::info!(player_id = %entry.player_id, score = entry.score, "Leaderboard entry");
    }

    Ok(())
}
