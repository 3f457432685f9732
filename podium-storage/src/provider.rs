//! Score provider capability.

use std::ops::RangeInclusive;

use ::async_trait::async_trait;
use podium_core::{ConfigError, PlayerId, ProviderError, Score};
use rand::Rng;

/// Supplies a single player's current score on demand.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    async fn get_score(&self, player_id: PlayerId) -> Result<Score, ProviderError>;
}

/// Provider that returns a uniformly random score for any player.
///
/// Stand-in for a real game-state source in demos and local runs.
#[derive(Debug, Clone)]
pub struct RandomScoreProvider {
    range: RangeInclusive<Score>,
}

impl RandomScoreProvider {
    pub fn new(min: Score, max: Score) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidValue {
                field: "score_range".to_string(),
                value: format!("{}..={}", min, max),
                reason: "min must not exceed max".to_string(),
            });
        }
        Ok(Self { range: min..=max })
    }

    pub fn range(&self) -> &RangeInclusive<Score> {
        &self.range
    }
}

impl Default for RandomScoreProvider {
    fn default() -> Self {
        Self { range: 1..=100 }
    }
}

#[async_trait]
impl ScoreProvider for RandomScoreProvider {
    async fn get_score(&self, _player_id: PlayerId) -> Result<Score, ProviderError> {
        let score = rand::rng().random_range(self.range.clone());
        Ok(score)
    }
}
