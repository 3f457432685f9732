//! Podium Service - Leaderboard Reads and Writes
//!
//! Wires the ordered score store, the score provider and the leaderboard
//! cache into [`LeaderboardService`]. Requests are validated, answered from
//! the per-timespan cache or by walking the current bucket's sorted pages,
//! and score updates are fanned out to the daily, weekly, monthly and
//! all-time buckets.

pub mod config;
pub mod error;
pub mod services;
pub mod telemetry;

pub use config::{LeaderboardConfig, DEFAULT_PAGE_SIZE};
pub use error::{ServiceError, ServiceResult};
pub use services::{BucketWrite, LeaderboardService, UpdateReport};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
