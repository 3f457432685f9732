//! Service Layer
//!
//! Business logic over the store, provider and cache capabilities.

mod leaderboard_service;

pub use leaderboard_service::*;
