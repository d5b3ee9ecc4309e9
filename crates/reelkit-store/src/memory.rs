//! In-memory job store.
//!
//! Reference implementation for the single-dispatcher deployment: every
//! operation runs inside one mutex critical section, which is what makes
//! `claim_next` and `retry_requeue` atomic. Running multiple dispatcher
//! processes against one store needs a lease-based claim and is out of
//! scope here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use reelkit_models::{Job, JobId, JobStatus};

use crate::error::{StoreError, StoreResult};
use crate::store::{JobStore, RetryDecision};

struct Entry {
    job: Job,
    /// Insertion sequence, the FIFO tie-break when `created_at` collides.
    seq: u64,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Entry>,
    next_seq: u64,
}

/// Mutex-backed job store.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: Mutex<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicked holder cannot leave a half-applied update; every
        // mutation below is a single assignment sequence on one record.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: Job) -> StoreResult<JobId> {
        let mut inner = self.lock();
        let id = job.id.clone();
        if inner.jobs.contains_key(&id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(id.clone(), Entry { job, seq });
        Ok(id)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let inner = self.lock();
        Ok(inner.jobs.get(id).map(|e| e.job.clone()))
    }

    async fn claim_next(&self) -> StoreResult<Option<Job>> {
        let mut inner = self.lock();

        let best = inner
            .jobs
            .values()
            .filter(|e| e.job.status == JobStatus::Pending)
            // Highest priority wins; within a priority, oldest submission.
            .min_by_key(|e| (std::cmp::Reverse(e.job.priority), e.job.created_at, e.seq))
            .map(|e| e.job.id.clone());

        let Some(id) = best else {
            return Ok(None);
        };

        let entry = inner
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        entry.job.start_attempt();
        debug!(job_id = %id, kind = %entry.job.kind, "claimed job");
        Ok(Some(entry.job.clone()))
    }

    async fn update_progress(
        &self,
        id: &JobId,
        progress: u8,
        message: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.lock();
        let entry = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        Ok(entry.job.apply_progress(progress, Some(message.to_string())))
    }

    async fn update_status(
        &self,
        id: &JobId,
        status: JobStatus,
        progress: Option<u8>,
        message: Option<&str>,
    ) -> StoreResult<bool> {
        let mut inner = self.lock();
        let entry = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        let job = &mut entry.job;

        if job.status.is_terminal() {
            // Terminal statuses are sticky; repeating the same one is an
            // idempotent no-op, anything else is ignored.
            return Ok(job.status == status);
        }

        match status {
            JobStatus::Pending => {
                job.status = JobStatus::Pending;
                job.started_at = None;
                job.progress = 0;
            }
            JobStatus::Processing => {
                job.status = JobStatus::Processing;
                if job.started_at.is_none() {
                    job.started_at = Some(Utc::now());
                }
                if let Some(p) = progress {
                    job.progress = job.progress.max(p.min(100));
                }
            }
            terminal => {
                job.finish(terminal, None);
            }
        }
        if let Some(m) = message {
            job.stage_message = Some(m.to_string());
        }
        Ok(true)
    }

    async fn retry_requeue(&self, id: &JobId, error: &str) -> StoreResult<RetryDecision> {
        let mut inner = self.lock();
        let entry = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        let job = &mut entry.job;

        if job.status != JobStatus::Processing {
            return Ok(RetryDecision::Skipped);
        }

        if job.can_retry() {
            job.requeue(error);
            Ok(RetryDecision::Requeued {
                attempt: job.retry_count,
            })
        } else {
            job.finish(JobStatus::Failed, Some(error.to_string()));
            Ok(RetryDecision::Exhausted)
        }
    }

    async fn fail_terminal(&self, id: &JobId, error: &str) -> StoreResult<bool> {
        let mut inner = self.lock();
        let entry = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;
        let job = &mut entry.job;

        if job.status != JobStatus::Processing {
            return Ok(false);
        }
        job.finish(JobStatus::Failed, Some(error.to_string()));
        Ok(true)
    }

    async fn cancel(&self, id: &JobId, owner: &str) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(entry) = inner.jobs.get_mut(id) else {
            return Ok(false);
        };
        let job = &mut entry.job;

        if job.owner != owner || !job.status.is_active() {
            return Ok(false);
        }
        job.finish(JobStatus::Cancelled, None);
        debug!(job_id = %id, owner = %owner, "cancelled job");
        Ok(true)
    }

    async fn list_by_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Job>> {
        let inner = self.lock();
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|e| e.job.owner == owner)
            .map(|e| e.job.clone())
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn delete_terminal_older_than(&self, age: Duration) -> StoreResult<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(age)
                .map_err(|e| StoreError::internal(format!("retention out of range: {e}")))?;

        let mut inner = self.lock();
        let before = inner.jobs.len();
        inner.jobs.retain(|_, e| {
            !(e.job.status.is_terminal()
                && e.job.completed_at.map(|t| t < cutoff).unwrap_or(false))
        });
        Ok(before - inner.jobs.len())
    }

    async fn count_with_status(&self, status: JobStatus) -> StoreResult<usize> {
        let inner = self.lock();
        Ok(inner
            .jobs
            .values()
            .filter(|e| e.job.status == status)
            .count())
    }
}
