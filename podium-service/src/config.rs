//! Service Configuration Module
//!
//! Configuration for the leaderboard service, loaded from environment
//! variables with sensible defaults.

use std::time::Duration;

use podium_core::{ConfigError, PodiumResult, DEFAULT_STORE_NAME};
use podium_storage::ReusePolicy;

/// Default number of entries fetched per store page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ============================================================================
// LEADERBOARD CONFIGURATION
// ============================================================================

/// Leaderboard service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    /// Name of the data store all buckets live under.
    pub store_name: String,

    /// Entries per page when walking a sorted bucket.
    pub page_size: usize,

    /// When a cached leaderboard may be served.
    pub cache_policy: ReusePolicy,

    /// Upper bound on any single store call. `None` waits forever.
    pub store_timeout: Option<Duration>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_policy: ReusePolicy::default(),
            store_timeout: None,
        }
    }
}

impl LeaderboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_cache_policy(mut self, policy: ReusePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Create LeaderboardConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PODIUM_STORE_NAME`: Data store name (default: "leaderboard")
    /// - `PODIUM_PAGE_SIZE`: Entries per page (default: 10)
    /// - `PODIUM_CACHE_POLICY`: "older_than", "younger_than" or "never" (default: older_than)
    /// - `PODIUM_CACHE_WINDOW_SECS`: Reuse window in seconds (default: 60)
    /// - `PODIUM_STORE_TIMEOUT_MS`: Per-call store timeout (default: unset, no timeout)
    pub fn from_env() -> PodiumResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> PodiumResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_name = lookup("PODIUM_STORE_NAME").unwrap_or(defaults.store_name);

        let page_size = match lookup("PODIUM_PAGE_SIZE") {
            Some(raw) => parse_field("PODIUM_PAGE_SIZE", &raw)?,
            None => defaults.page_size,
        };

        let window = match lookup("PODIUM_CACHE_WINDOW_SECS") {
            Some(raw) => Duration::from_secs(parse_field("PODIUM_CACHE_WINDOW_SECS", &raw)?),
            None => ReusePolicy::DEFAULT_WINDOW,
        };

        let cache_policy = match lookup("PODIUM_CACHE_POLICY") {
            Some(name) => ReusePolicy::from_parts(&name, window)?,
            None => ReusePolicy::OlderThan(window),
        };

        let store_timeout = match lookup("PODIUM_STORE_TIMEOUT_MS") {
            Some(raw) => Some(Duration::from_millis(parse_field(
                "PODIUM_STORE_TIMEOUT_MS",
                &raw,
            )?)),
            None => None,
        };

        let config = Self {
            store_name,
            page_size,
            cache_policy,
            store_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - store_name is not blank
    /// - page_size > 0
    /// - store_timeout, when set, is not zero
    pub fn validate(&self) -> PodiumResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(invalid("store_name", &self.store_name, "store_name must not be empty"));
        }

        if self.page_size == 0 {
            return Err(invalid(
                "page_size",
                &self.page_size.to_string(),
                "page_size must be greater than 0",
            ));
        }

        if let Some(timeout) = self.store_timeout {
            if timeout.is_zero() {
                return Err(invalid(
                    "store_timeout",
                    &format!("{:?}", timeout),
                    "store_timeout must be positive",
                ));
            }
        }

        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "not a non-negative integer".to_string(),
    })
}

fn invalid(field: &str, value: &str, reason: &str) -> podium_core::PodiumError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
