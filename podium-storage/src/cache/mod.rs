//! Leaderboard cache with explicit reuse contracts.
//!
//! Recomputing a leaderboard walks the store page by page, so the latest
//! result per timespan is kept in memory. Whether a cached result may be
//! served is decided by a [`ReusePolicy`] the caller passes on every lookup;
//! the cache itself never guesses.
//!
//! # Example
//!
//! ```ignore
//! let cache = LeaderboardCache::new();
//! if let Some(board) = cache.lookup(Timespan::Daily, 10, clock.now(), ReusePolicy::default()) {
//!     return Ok(board);
//! }
//! ```

pub mod leaderboard_cache;
pub mod reuse;

pub use leaderboard_cache::{CacheEntry, CacheStats, LeaderboardCache};
pub use reuse::{age_since, ReusePolicy};
