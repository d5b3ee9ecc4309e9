//! The dispatch loop.
//!
//! One cooperative control loop per process: claim the best pending job,
//! hand it to the matching handler on its own task, and keep the number of
//! in-flight jobs under the configured cap. The semaphore permit travels
//! into the handler task, so the slot is released on success, failure,
//! timeout, or panic alike.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{watch, Semaphore};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use reelkit_models::{Job, JobStatus};
use reelkit_store::{JobStore, RetryDecision};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::handler::{HandlerRegistry, StageContext};
use crate::retry::{classify, RetryAction};

/// Claims pending jobs and runs handlers under a concurrency cap.
///
/// Explicitly constructed and injected with its store and registry; start
/// with [`Dispatcher::run`], stop with [`Dispatcher::shutdown`].
pub struct Dispatcher {
    config: WorkerConfig,
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    slots: Arc<Semaphore>,
    shutdown: watch::Sender<bool>,
}

impl Dispatcher {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn JobStore>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            store,
            registry,
            slots,
            shutdown,
        }
    }

    /// Run the dispatch loop until [`shutdown`](Self::shutdown) is called,
    /// then drain in-flight jobs (bounded by `shutdown_timeout`).
    pub async fn run(&self) {
        info!(
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            kinds = ?self.registry.kinds(),
            "Starting dispatcher"
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping dispatcher");
                        break;
                    }
                }
                _ = self.poll_once() => {}
            }
        }

        info!("Waiting for in-flight jobs to complete...");
        let _ = timeout(self.config.shutdown_timeout, self.wait_for_jobs()).await;
        info!("Dispatcher stopped");
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// One scheduling decision: back off while saturated, otherwise try to
    /// claim and start a job.
    async fn poll_once(&self) {
        if self.slots.available_permits() == 0 {
            sleep(self.config.busy_poll).await;
            return;
        }

        match self.store.claim_next().await {
            Ok(Some(job)) => {
                let permit = match Arc::clone(&self.slots).acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return, // semaphore closed, shutting down
                };
                counter!("reelkit_jobs_claimed_total").increment(1);

                let store = Arc::clone(&self.store);
                let registry = Arc::clone(&self.registry);
                let job_timeout = self.config.job_timeout;

                tokio::spawn(async move {
                    let _permit = permit; // released with the task, whatever happens
                    execute_job(store, registry, job_timeout, job).await;
                });
            }
            Ok(None) => sleep(self.config.idle_poll).await,
            Err(e) => {
                error!("Failed to claim next job: {}", e);
                sleep(self.config.busy_poll).await;
            }
        }
    }

    /// Wait until every slot is free again.
    async fn wait_for_jobs(&self) {
        loop {
            if self.slots.available_permits() == self.config.max_concurrent_jobs {
                break;
            }
            sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Run one claimed job through its handler and settle the outcome.
async fn execute_job(
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
    job_timeout: Duration,
    job: Job,
) {
    let job_id = job.id.clone();
    let ctx = StageContext::new(&job, Arc::clone(&store));
    info!(job_id = %job_id, kind = %job.kind, attempt = job.retry_count + 1, "Executing job");

    let result = run_handler(&registry, job_timeout, &job, &ctx).await;

    match result {
        Ok(()) => {
            match store
                .update_status(&job_id, JobStatus::Completed, Some(100), Some("Done"))
                .await
            {
                Ok(true) => {
                    counter!("reelkit_jobs_completed_total").increment(1);
                    info!(job_id = %job_id, "Job completed");
                }
                Ok(false) => {
                    // Cancelled between the last stage and here; the
                    // terminal status on the record wins.
                    info!(job_id = %job_id, "Job finished after cancellation; status untouched");
                }
                Err(e) => error!(job_id = %job_id, "Failed to record completion: {}", e),
            }
        }
        Err(WorkerError::Cancelled) => {
            counter!("reelkit_jobs_cancelled_total").increment(1);
            info!(job_id = %job_id, "Job cancelled by owner; handler stopped at stage boundary");
        }
        Err(e) => settle_failure(&store, &job_id, e).await,
    }
}

async fn run_handler(
    registry: &HandlerRegistry,
    job_timeout: Duration,
    job: &Job,
    ctx: &StageContext,
) -> WorkerResult<()> {
    let Some(handler) = registry.get(job.kind) else {
        // Submission validates kinds, so this only happens when a handler
        // was deregistered between deployments.
        return Err(WorkerError::job_failed(format!(
            "no handler registered for {}",
            job.kind
        )));
    };

    match timeout(job_timeout, handler.execute(job, ctx)).await {
        Ok(result) => result,
        Err(_) => Err(WorkerError::Timeout(job_timeout)),
    }
}

async fn settle_failure(store: &Arc<dyn JobStore>, job_id: &reelkit_models::JobId, error: WorkerError) {
    let message = error.to_string();

    match classify(&error) {
        RetryAction::Ignore => {}
        RetryAction::FailTerminal => {
            counter!("reelkit_jobs_failed_total").increment(1);
            warn!(job_id = %job_id, "Permanent failure, not retrying: {}", message);
            if let Err(e) = store.fail_terminal(job_id, &message).await {
                error!(job_id = %job_id, "Failed to record terminal failure: {}", e);
            }
        }
        RetryAction::Requeue => match store.retry_requeue(job_id, &message).await {
            Ok(RetryDecision::Requeued { attempt }) => {
                counter!("reelkit_jobs_retried_total").increment(1);
                info!(job_id = %job_id, attempt, "Job failed, requeued: {}", message);
            }
            Ok(RetryDecision::Exhausted) => {
                counter!("reelkit_jobs_failed_total").increment(1);
                warn!(job_id = %job_id, "Job failed, retries exhausted: {}", message);
            }
            Ok(RetryDecision::Skipped) => {
                info!(job_id = %job_id, "Job left processing before retry bookkeeping; skipped");
            }
            Err(e) => error!(job_id = %job_id, "Failed to record retry: {}", e),
        },
    }
}
