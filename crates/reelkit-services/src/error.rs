//! Shared error taxonomy for collaborator services.

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surfaced by an external collaborator.
///
/// The split that matters to the orchestration core is transient versus
/// permanent: transient failures are worth another attempt, permanent ones
/// are not and retrying them only wastes the attempt budget.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal service error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::Network(_)
                | ServiceError::Unavailable(_)
                | ServiceError::RateLimited(_)
                | ServiceError::Internal(_)
        )
    }
}
