//! The submission/inspection surface exposed to the API layer.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use reelkit_models::{Job, JobId, JobPayload, JobPriority};
use reelkit_store::{JobProgress, JobStore};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::handler::HandlerRegistry;

/// Caller-facing job operations: submit, inspect, cancel, list, clean up.
///
/// Explicitly constructed with its store and registry; there is no global
/// queue instance.
pub struct JobService {
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    config: WorkerConfig,
}

impl JobService {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn JobStore>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    /// Submit a job. Unknown kinds and malformed payloads are rejected here,
    /// synchronously — they never enter the queue.
    pub async fn add_job(
        &self,
        payload: JobPayload,
        owner: impl Into<String>,
        priority: JobPriority,
    ) -> WorkerResult<JobId> {
        let kind = payload.kind();
        if !self.registry.contains(kind) {
            return Err(WorkerError::validation(format!(
                "no handler registered for job kind {kind}"
            )));
        }
        payload.validate()?;

        let job = Job::new(payload, owner, priority)
            .with_max_retries(self.config.default_max_retries);
        let id = self.store.insert(job).await?;
        info!(job_id = %id, kind = %kind, priority = %priority, "Job submitted");
        Ok(id)
    }

    /// Current progress snapshot, with an advisory ETA while processing.
    pub async fn job_progress(&self, id: &JobId) -> WorkerResult<JobProgress> {
        let job = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| WorkerError::not_found(id))?;
        Ok(JobProgress::from_job(&job, Utc::now()))
    }

    /// Owner-scoped cancellation. Returns `false` for terminal jobs, wrong
    /// owners, and unknown IDs. Cooperative: a processing job's handler
    /// stops at its next stage boundary, not immediately.
    pub async fn cancel_job(&self, id: &JobId, owner: &str) -> WorkerResult<bool> {
        let cancelled = self.store.cancel(id, owner).await?;
        if cancelled {
            info!(job_id = %id, owner = %owner, "Job cancelled");
        }
        Ok(cancelled)
    }

    /// The owner's jobs, most recent first.
    pub async fn list_jobs(&self, owner: &str, limit: usize) -> WorkerResult<Vec<Job>> {
        Ok(self.store.list_by_owner(owner, limit).await?)
    }

    /// Delete terminal jobs past the retention window. Returns the count.
    pub async fn cleanup_old_jobs(&self) -> WorkerResult<usize> {
        Ok(self
            .store
            .delete_terminal_older_than(self.config.retention)
            .await?)
    }
}
