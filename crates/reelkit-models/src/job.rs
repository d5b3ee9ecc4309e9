//! Job record and lifecycle types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::payload::JobPayload;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of job, one per registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Analyze a source video and fan out clip jobs
    ProcessVideo,
    /// Render a single clip from an already-fetched source
    GenerateClip,
    /// Produce styled subtitle segments for a clip
    GenerateSubtitles,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::ProcessVideo => "process_video",
            JobKind::GenerateClip => "generate_clip",
            JobKind::GenerateSubtitles => "generate_subtitles",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process_video" => Ok(JobKind::ProcessVideo),
            "generate_clip" => Ok(JobKind::GenerateClip),
            "generate_subtitles" => Ok(JobKind::GenerateSubtitles),
            other => Err(format!("unknown job kind: {other}")),
        }
    }
}

/// Job state in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting in queue
    #[default]
    Pending,
    /// Job is being processed
    Processing,
    /// Job completed successfully
    Completed,
    /// Job failed after exhausting retries
    Failed,
    /// Job was cancelled by its owner
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// States from which the owner may still cancel.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scheduling priority. Ordering matters: `High` is claimed before `Normal`
/// before `Low`. There is no aging, so sustained high-priority load can
/// starve lower priorities indefinitely.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Normal => "normal",
            JobPriority::High => "high",
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_max_retries() -> u32 {
    3
}

/// A unit of work tracked by the job store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Job kind, derived from the payload at creation
    pub kind: JobKind,

    /// Type-specific payload; opaque to the dispatcher
    pub payload: JobPayload,

    /// Submitting principal; scopes cancellation and listing
    pub owner: String,

    /// Scheduling priority
    #[serde(default)]
    pub priority: JobPriority,

    /// Job status
    #[serde(default)]
    pub status: JobStatus,

    /// Progress (0-100), non-decreasing within a processing attempt
    #[serde(default)]
    pub progress: u8,

    /// Human-readable description of the current stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_message: Option<String>,

    /// Number of retry attempts so far
    #[serde(default)]
    pub retry_count: u32,

    /// Maximum retries allowed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Start of the current processing attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Set on any terminal transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Last failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Job {
    /// Create a new pending job.
    pub fn new(payload: JobPayload, owner: impl Into<String>, priority: JobPriority) -> Self {
        Self {
            id: JobId::new(),
            kind: payload.kind(),
            payload,
            owner: owner.into(),
            priority,
            status: JobStatus::Pending,
            progress: 0,
            stage_message: None,
            retry_count: 0,
            max_retries: default_max_retries(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    /// Override the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Begin a processing attempt. Each attempt restarts from zero progress;
    /// there is no resumable checkpointing.
    pub fn start_attempt(&mut self) {
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self.progress = 0;
        self.stage_message = None;
        self.error_message = None;
    }

    /// Apply a progress checkpoint. Only valid while processing; progress
    /// never decreases within an attempt. Returns whether the update stuck.
    pub fn apply_progress(&mut self, progress: u8, message: Option<String>) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.progress = self.progress.max(progress.min(100));
        if message.is_some() {
            self.stage_message = message;
        }
        true
    }

    /// Enter a terminal state, stamping `completed_at` once.
    pub fn finish(&mut self, status: JobStatus, error: Option<String>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        if status == JobStatus::Completed {
            self.progress = 100;
            self.error_message = None;
        } else if error.is_some() {
            self.error_message = error;
        }
    }

    /// Whether another attempt is allowed after a failure.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Put the job back in the pending pool for another attempt.
    pub fn requeue(&mut self, error: impl Into<String>) {
        self.retry_count += 1;
        self.status = JobStatus::Pending;
        self.started_at = None;
        self.progress = 0;
        self.stage_message = None;
        self.error_message = Some(error.into());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
