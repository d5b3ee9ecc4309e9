//! The job store port.
//!
//! The store is the only shared mutable resource across concurrent
//! handlers. Every operation that reads and then writes a record must be a
//! single atomic step with respect to other callers, so a claim can never
//! hand the same job to two handlers and retry bookkeeping can never lose
//! an increment.

use std::time::Duration;

use async_trait::async_trait;

use reelkit_models::{Job, JobId, JobStatus};

use crate::error::StoreResult;

/// Outcome of the atomic retry bookkeeping on a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Attempt budget remained; the job is pending again.
    Requeued {
        /// The attempt number just recorded (1-based).
        attempt: u32,
    },
    /// `retry_count` reached `max_retries`; the job is terminally failed.
    Exhausted,
    /// The job was no longer processing (e.g. cancelled mid-flight); nothing
    /// was changed.
    Skipped,
}

/// Durable record of jobs and their state. Pure data access, no scheduling
/// logic.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. The caller validates payload and kind beforehand.
    async fn insert(&self, job: Job) -> StoreResult<JobId>;

    /// Fetch a job by ID.
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Atomically claim the best pending job: highest priority first, oldest
    /// first within a priority. The returned job has already transitioned to
    /// `processing` with a fresh `started_at` and zeroed progress, so no
    /// other claimant can observe it as pending.
    async fn claim_next(&self) -> StoreResult<Option<Job>>;

    /// Record a stage checkpoint. Applies only while the job is
    /// `processing`; progress never decreases within an attempt. Returns
    /// whether the update was applied — `false` signals the handler that the
    /// job left `processing` underneath it (cancellation).
    async fn update_progress(&self, id: &JobId, progress: u8, message: &str)
        -> StoreResult<bool>;

    /// Idempotent status update. Terminal statuses stamp `completed_at`
    /// once and are sticky: transitions out of a terminal status are
    /// ignored (returns `false`), which keeps a late handler completion
    /// from overwriting an owner's cancellation.
    async fn update_status(
        &self,
        id: &JobId,
        status: JobStatus,
        progress: Option<u8>,
        message: Option<&str>,
    ) -> StoreResult<bool>;

    /// Atomic compare-and-increment retry bookkeeping for a failed attempt.
    /// Requeues while the attempt budget lasts, fails terminally once
    /// exhausted, and skips jobs that already left `processing`.
    async fn retry_requeue(&self, id: &JobId, error: &str) -> StoreResult<RetryDecision>;

    /// Terminal failure without touching the retry budget, for errors that
    /// retrying cannot fix. Returns whether the job was transitioned.
    async fn fail_terminal(&self, id: &JobId, error: &str) -> StoreResult<bool>;

    /// Owner-scoped cancellation. Succeeds only while the job is pending or
    /// processing and the owner matches; terminal jobs are never mutated.
    async fn cancel(&self, id: &JobId, owner: &str) -> StoreResult<bool>;

    /// List an owner's jobs, most recent first.
    async fn list_by_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Job>>;

    /// Delete terminal jobs whose `completed_at` is older than `age`.
    /// Returns the number of rows removed.
    async fn delete_terminal_older_than(&self, age: Duration) -> StoreResult<usize>;

    /// Number of jobs currently in the given status.
    async fn count_with_status(&self, status: JobStatus) -> StoreResult<usize>;
}
