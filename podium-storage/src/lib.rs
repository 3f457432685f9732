//! Podium Storage - Collaborator Traits, In-Memory Store and Cache
//!
//! Defines the capabilities the leaderboard service consumes (the ordered
//! score store and the score provider), an in-memory store for local runs
//! and tests, and the per-timespan leaderboard cache.

pub mod cache;
pub mod memory;
pub mod provider;
pub mod store;

pub use cache::{age_since, CacheEntry, CacheStats, LeaderboardCache, ReusePolicy};
pub use memory::{InMemoryOrderedStore, InMemoryPages};
pub use provider::{RandomScoreProvider, ScoreProvider};
pub use store::{OrderedScoreStore, SortedPages, StoreEntry};
