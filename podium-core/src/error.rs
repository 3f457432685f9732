//! Error types for Podium operations

use crate::{BucketId, PlayerId};
use std::time::Duration;
use thiserror::Error;

/// Request validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown timespan: {value} (expected daily, weekly, monthly or alltime)")]
    UnknownTimespan { value: String },

    #[error("Invalid value for numPlayers: {value} - must be at least 1")]
    NonPositivePlayers { value: i64 },

    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Ordered score store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable for bucket {bucket}: {reason}")]
    Unavailable { bucket: BucketId, reason: String },

    #[error("Store call on bucket {bucket} timed out after {after:?}")]
    Timeout { bucket: BucketId, after: Duration },

    #[error("Malformed entry in bucket {bucket}: key {key:?} is not a player id")]
    MalformedEntry { bucket: BucketId, key: String },
}

impl StoreError {
    /// Shorthand for the common "backend refused the call" case.
    pub fn unavailable(bucket: &BucketId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            bucket: bucket.clone(),
            reason: reason.into(),
        }
    }

    /// The bucket the failing call was addressed to.
    pub fn bucket(&self) -> &BucketId {
        match self {
            Self::Unavailable { bucket, .. }
            | Self::Timeout { bucket, .. }
            | Self::MalformedEntry { bucket, .. } => bucket,
        }
    }
}

/// Score provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Score unavailable for player {player_id}: {reason}")]
    ScoreUnavailable { player_id: PlayerId, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse error category, used for logging and caller-side branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    StoreUnavailable,
    Provider,
    Config,
}

/// Master error type for all Podium errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PodiumError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl PodiumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::StoreUnavailable,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for Podium operations.
pub type PodiumResult<T> = Result<T, PodiumError>;

// =============================================================================
// TESTS
// =============================================================================
