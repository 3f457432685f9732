//! Reuse contracts for cached leaderboards.
//!
//! A cached leaderboard is only ever served when it is long enough for the
//! request. On top of that, the policy decides which ages qualify.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use podium_core::ConfigError;

/// When a cached leaderboard may be served instead of recomputing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReusePolicy {
    /// Reuse entries whose age is strictly greater than the window.
    ///
    /// The default. A leaderboard younger than the window is recomputed on
    /// every request; an older one is served from memory.
    OlderThan(Duration),

    /// Reuse entries whose age is at most the window (conventional TTL).
    YoungerThan(Duration),

    /// Always recompute.
    Never,
}

impl ReusePolicy {
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    /// Build a policy from its configuration name and window.
    pub fn from_parts(name: &str, window: Duration) -> Result<Self, ConfigError> {
        let kind: ReusePolicyKind = name.parse()?;
        Ok(match kind {
            ReusePolicyKind::OlderThan => Self::OlderThan(window),
            ReusePolicyKind::YoungerThan => Self::YoungerThan(window),
            ReusePolicyKind::Never => Self::Never,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OlderThan(_) => "older_than",
            Self::YoungerThan(_) => "younger_than",
            Self::Never => "never",
        }
    }

    pub fn window(&self) -> Option<Duration> {
        match self {
            Self::OlderThan(window) | Self::YoungerThan(window) => Some(*window),
            Self::Never => None,
        }
    }

    /// Whether an entry of `age` holding `cached_len` rows may answer a
    /// request for `requested` rows.
    pub fn allows(&self, age: Duration, cached_len: usize, requested: usize) -> bool {
        if cached_len < requested {
            return false;
        }
        match self {
            Self::OlderThan(window) => age > *window,
            Self::YoungerThan(window) => age <= *window,
            Self::Never => false,
        }
    }
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self::OlderThan(Self::DEFAULT_WINDOW)
    }
}

/// Age of a value retrieved at `retrieved_at`, clamped at zero for clock skew.
pub fn age_since(retrieved_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(retrieved_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReusePolicyKind {
    OlderThan,
    YoungerThan,
    Never,
}

impl FromStr for ReusePolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "older_than" => Ok(Self::OlderThan),
            "younger_than" => Ok(Self::YoungerThan),
            "never" => Ok(Self::Never),
            other => Err(ConfigError::InvalidValue {
                field: "cache_policy".to_string(),
                value: other.to_string(),
                reason: "expected older_than, younger_than or never".to_string(),
            }),
        }
    }
}
