//! Handler interface, registry, and the stage-reporting context.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use reelkit_models::{Job, JobId, JobKind, JobPayload, JobPriority};
use reelkit_store::JobStore;

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;

/// Type-specific job logic. One implementation per `JobKind`, resolved from
/// the registry at dispatch time.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The kind this handler executes.
    fn kind(&self) -> JobKind;

    /// Run the job's stage sequence. Stage checkpoints and fan-out go
    /// through `ctx`; a returned error lands in the retry policy.
    async fn execute(&self, job: &Job, ctx: &StageContext) -> WorkerResult<()>;
}

/// Registry mapping job kinds to handlers, populated at startup.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobKind, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own kind. Last registration wins.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&kind).cloned()
    }

    /// Whether submissions of this kind are accepted.
    pub fn contains(&self, kind: JobKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<JobKind> {
        self.handlers.keys().copied().collect()
    }
}

/// Per-job context handed to handlers: stage checkpoints, fan-out, logging.
pub struct StageContext {
    job_id: JobId,
    owner: String,
    store: Arc<dyn JobStore>,
    logger: JobLogger,
}

impl StageContext {
    pub fn new(job: &Job, store: Arc<dyn JobStore>) -> Self {
        Self {
            job_id: job.id.clone(),
            owner: job.owner.clone(),
            store,
            logger: JobLogger::new(&job.id, job.kind),
        }
    }

    /// Record a stage checkpoint. Returns `Cancelled` when the job is no
    /// longer processing, which is how an owner's cancellation reaches a
    /// running handler: it stops at the next stage boundary and the
    /// terminal status on the record stays untouched.
    pub async fn stage(&self, progress: u8, message: &str) -> WorkerResult<()> {
        let applied = self
            .store
            .update_progress(&self.job_id, progress, message)
            .await?;
        if !applied {
            return Err(WorkerError::Cancelled);
        }
        self.logger.log_progress(progress, message);
        Ok(())
    }

    /// Enqueue an independent child job owned by the same principal.
    /// Fire-and-forget: the parent's completion never waits on children.
    pub async fn spawn_child(
        &self,
        payload: JobPayload,
        priority: JobPriority,
    ) -> WorkerResult<JobId> {
        payload.validate()?;
        let child = Job::new(payload, self.owner.clone(), priority);
        Ok(self.store.insert(child).await?)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn warn(&self, message: &str) {
        self.logger.log_warning(message);
    }
}
