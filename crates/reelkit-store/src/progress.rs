//! Progress snapshots and ETA estimation.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use reelkit_models::{Job, JobStatus};

/// Progress below which no ETA is derived; early estimates are noise.
const ETA_MIN_PROGRESS: u8 = 10;

/// Point-in-time view of a job's progress, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobProgress {
    pub job_id: String,

    pub status: JobStatus,

    /// Progress percentage (0-100)
    pub progress: u8,

    /// Current stage description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last failure detail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Advisory ETA; never used for scheduling decisions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_seconds_remaining: Option<u64>,
}

impl JobProgress {
    /// Snapshot a job as of `now`.
    pub fn from_job(job: &Job, now: DateTime<Utc>) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.status,
            progress: job.progress,
            message: job.stage_message.clone(),
            error_message: job.error_message.clone(),
            estimated_seconds_remaining: estimate_seconds_remaining(job, now),
        }
    }
}

/// `remaining ≈ elapsed × (100/progress − 1)`, only while processing and
/// past the early-progress noise floor.
fn estimate_seconds_remaining(job: &Job, now: DateTime<Utc>) -> Option<u64> {
    if job.status != JobStatus::Processing || job.progress <= ETA_MIN_PROGRESS {
        return None;
    }
    let started_at = job.started_at?;
    let elapsed = (now - started_at).num_seconds();
    if elapsed <= 0 {
        return None;
    }
    let fraction = f64::from(job.progress) / 100.0;
    let remaining = elapsed as f64 * (1.0 / fraction - 1.0);
    Some(remaining.round() as u64)
}
