//! Error types for the service binary and its bootstrap.
//!
//! Leaderboard operations return [`PodiumResult`](podium_core::PodiumResult);
//! this type only adds the failures that can happen while wiring the
//! process together.

use podium_core::PodiumError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Podium(#[from] PodiumError),

    #[error("Failed to initialize telemetry: {reason}")]
    Telemetry { reason: String },

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task {
            reason: err.to_string(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
