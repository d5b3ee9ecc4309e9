//! Worker error types.

use std::time::Duration;

use thiserror::Error;

use reelkit_models::{PayloadError, TimecodeError};
use reelkit_services::ServiceError;
use reelkit_store::StoreError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    /// The job left `processing` underneath its handler (owner cancel).
    #[error("Job cancelled")]
    Cancelled,

    #[error("Job timed out after {0:?}")]
    Timeout(Duration),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Timecode error: {0}")]
    Timecode(#[from] TimecodeError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    /// Whether another attempt cannot fix this failure. Permanent failures
    /// go terminal immediately instead of burning the retry budget.
    pub fn is_permanent(&self) -> bool {
        match self {
            WorkerError::JobFailed(_)
            | WorkerError::Validation(_)
            | WorkerError::NotFound(_)
            | WorkerError::Payload(_)
            | WorkerError::Timecode(_) => true,
            WorkerError::Service(e) => !e.is_transient(),
            WorkerError::Store(e) => {
                matches!(e, StoreError::NotFound(_) | StoreError::Duplicate(_))
            }
            WorkerError::Cancelled | WorkerError::Timeout(_) => false,
        }
    }
}
