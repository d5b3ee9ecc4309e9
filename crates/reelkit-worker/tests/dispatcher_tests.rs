//! End-to-end dispatcher scenarios against the in-memory store.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use common::{fast_config, wait_all_terminal, FakeMedia, FakeRecords, FakeStorage, FakeTranscripts};
use reelkit_models::{
    ClipPhase, GenerateClipPayload, Job, JobKind, JobPayload, JobPriority, JobStatus,
    ProcessVideoPayload,
};
use reelkit_services::ServiceError;
use reelkit_store::{JobStore, MemoryJobStore};
use reelkit_worker::{
    Dispatcher, GenerateClipHandler, GenerateSubtitlesHandler, HandlerRegistry, JobHandler,
    JobService, ProcessVideoHandler, StageContext, WorkerConfig, WorkerError, WorkerResult,
};

struct Harness {
    store: Arc<dyn JobStore>,
    service: JobService,
    dispatcher: Arc<Dispatcher>,
    run_task: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(config: WorkerConfig, registry: HandlerRegistry) -> Self {
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let registry = Arc::new(registry);
        let service = JobService::new(config.clone(), Arc::clone(&store), Arc::clone(&registry));
        let dispatcher = Arc::new(Dispatcher::new(config, Arc::clone(&store), registry));
        let run_task = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.run().await })
        };
        Self {
            store,
            service,
            dispatcher,
            run_task,
        }
    }

    async fn stop(self) {
        self.dispatcher.shutdown();
        self.run_task.await.unwrap();
    }
}

fn clip_payload(title: &str) -> JobPayload {
    JobPayload::GenerateClip(GenerateClipPayload::new(
        "content-1",
        "sources/fake",
        title,
        "00:10",
        "00:40",
    ))
}

/// Scenario A: one `process_video` whose analysis yields 5 highlights fans
/// out exactly 5 `generate_clip` children at normal priority.
#[tokio::test]
async fn process_video_fans_out_clip_children() {
    let media = Arc::new(FakeMedia);
    let transcripts = Arc::new(FakeTranscripts { highlight_count: 5 });
    let storage = Arc::new(FakeStorage::default());
    let records = Arc::new(FakeRecords::default());

    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(ProcessVideoHandler::new(
        media.clone(),
        transcripts.clone(),
        records.clone(),
    )));
    registry.register(Arc::new(GenerateClipHandler::new(
        media,
        storage.clone(),
        records.clone(),
    )));
    registry.register(Arc::new(GenerateSubtitlesHandler::new(
        transcripts,
        records.clone(),
    )));

    let harness = Harness::start(fast_config(3), registry);

    let parent = harness
        .service
        .add_job(
            JobPayload::ProcessVideo(ProcessVideoPayload::new("https://example.com/watch?v=demo")),
            "alice",
            JobPriority::High,
        )
        .await
        .unwrap();

    let jobs = wait_all_terminal(&harness.store, "alice", 6, Duration::from_secs(5)).await;

    let parent_job = jobs.iter().find(|j| j.id == parent).unwrap();
    assert_eq!(parent_job.status, JobStatus::Completed);
    assert_eq!(parent_job.progress, 100);

    let children: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::GenerateClip).collect();
    assert_eq!(children.len(), 5);
    for child in &children {
        assert_eq!(child.priority, JobPriority::Normal);
        assert_eq!(child.status, JobStatus::Completed);
    }

    // Each child produced a finalized clip row and two uploads.
    let clips = records.clips.lock().unwrap();
    assert_eq!(clips.len(), 5);
    assert!(clips.iter().all(|c| c.phase == ClipPhase::Ready));
    assert_eq!(storage.uploads.lock().unwrap().len(), 10);
    assert_eq!(records.contents.lock().unwrap().len(), 1);

    drop(clips);
    harness.stop().await;
}

struct SlowClipHandler {
    delay: Duration,
}

#[async_trait]
impl JobHandler for SlowClipHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, _job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        ctx.stage(50, "Working").await?;
        tokio::time::sleep(self.delay).await;
        ctx.stage(100, "Done").await?;
        Ok(())
    }
}

/// Scenario B: with a cap of 2, five submitted jobs never exceed 2 in
/// `processing` at any sampled instant, and all five settle.
#[tokio::test]
async fn concurrency_cap_is_never_exceeded() {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(SlowClipHandler {
        delay: Duration::from_millis(50),
    }));

    let harness = Harness::start(fast_config(2), registry);

    for i in 0..5 {
        harness
            .service
            .add_job(clip_payload(&format!("Clip {i}")), "bob", JobPriority::Normal)
            .await
            .unwrap();
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let mut max_processing = 0usize;
    loop {
        let processing = harness
            .store
            .count_with_status(JobStatus::Processing)
            .await
            .unwrap();
        max_processing = max_processing.max(processing);

        let jobs = harness.store.list_by_owner("bob", 100).await.unwrap();
        if jobs.len() == 5 && jobs.iter().all(|j| j.is_terminal()) {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "jobs did not settle in time"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    assert!(max_processing >= 1);
    assert!(
        max_processing <= 2,
        "observed {max_processing} jobs processing at once"
    );

    let jobs = harness.store.list_by_owner("bob", 100).await.unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Completed));

    harness.stop().await;
}

struct FlakyClipHandler {
    attempts: AtomicU32,
    failures_before_success: u32,
}

#[async_trait]
impl JobHandler for FlakyClipHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, _job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures_before_success {
            return Err(WorkerError::Service(ServiceError::network(
                "connection reset by peer",
            )));
        }
        ctx.stage(100, "Done").await?;
        Ok(())
    }
}

/// Scenario C: two transient failures then success completes the job with
/// `retry_count = 2`.
#[tokio::test]
async fn transient_failures_retry_until_success() {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(FlakyClipHandler {
        attempts: AtomicU32::new(0),
        failures_before_success: 2,
    }));

    let harness = Harness::start(fast_config(1), registry);
    let id = harness
        .service
        .add_job(clip_payload("Flaky"), "carol", JobPriority::Normal)
        .await
        .unwrap();

    let jobs = wait_all_terminal(&harness.store, "carol", 1, Duration::from_secs(5)).await;
    assert_eq!(jobs[0].id, id);
    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert_eq!(jobs[0].retry_count, 2);
    assert!(jobs[0].error_message.is_none());

    harness.stop().await;
}

struct AlwaysFailHandler;

#[async_trait]
impl JobHandler for AlwaysFailHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, _job: &Job, _ctx: &StageContext) -> WorkerResult<()> {
        Err(WorkerError::Service(ServiceError::network("stream reset")))
    }
}

/// Scenario D: failing every attempt exhausts the budget and preserves the
/// last failure message.
#[tokio::test]
async fn exhausted_retries_fail_terminally() {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(AlwaysFailHandler));

    let harness = Harness::start(fast_config(1), registry);
    harness
        .service
        .add_job(clip_payload("Doomed"), "dave", JobPriority::Normal)
        .await
        .unwrap();

    let jobs = wait_all_terminal(&harness.store, "dave", 1, Duration::from_secs(5)).await;
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert_eq!(jobs[0].retry_count, jobs[0].max_retries);
    let message = jobs[0].error_message.as_deref().unwrap();
    assert!(message.contains("stream reset"), "got: {message}");
    assert!(jobs[0].completed_at.is_some());

    harness.stop().await;
}

struct PermanentFailHandler;

#[async_trait]
impl JobHandler for PermanentFailHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, _job: &Job, _ctx: &StageContext) -> WorkerResult<()> {
        Err(WorkerError::Service(ServiceError::invalid_source(
            "source container is corrupt",
        )))
    }
}

/// Permanent failures skip the retry pool entirely.
#[tokio::test]
async fn permanent_failures_do_not_retry() {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(PermanentFailHandler));

    let harness = Harness::start(fast_config(1), registry);
    harness
        .service
        .add_job(clip_payload("Corrupt"), "erin", JobPriority::Normal)
        .await
        .unwrap();

    let jobs = wait_all_terminal(&harness.store, "erin", 1, Duration::from_secs(5)).await;
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert_eq!(jobs[0].retry_count, 0);
    assert!(jobs[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("corrupt"));

    harness.stop().await;
}

struct RecordingHandler {
    order: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl JobHandler for RecordingHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, job: &Job, _ctx: &StageContext) -> WorkerResult<()> {
        if let JobPayload::GenerateClip(p) = &job.payload {
            self.order.lock().unwrap().push(p.title.clone());
        }
        Ok(())
    }
}

/// High is dispatched before normal before low; within a priority, FIFO.
/// No aging: under sustained high-priority load the low job simply waits —
/// that starvation is the accepted tradeoff, not a bug.
#[tokio::test]
async fn dispatch_order_is_priority_then_fifo() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(RecordingHandler {
        order: Arc::clone(&order),
    }));

    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let registry = Arc::new(registry);
    let config = fast_config(1);
    let service = JobService::new(config.clone(), Arc::clone(&store), Arc::clone(&registry));

    // Submit before the dispatcher starts so claim order is fully decided
    // by the store.
    service
        .add_job(clip_payload("low"), "frank", JobPriority::Low)
        .await
        .unwrap();
    service
        .add_job(clip_payload("normal-1"), "frank", JobPriority::Normal)
        .await
        .unwrap();
    service
        .add_job(clip_payload("high"), "frank", JobPriority::High)
        .await
        .unwrap();
    service
        .add_job(clip_payload("normal-2"), "frank", JobPriority::Normal)
        .await
        .unwrap();

    let dispatcher = Arc::new(Dispatcher::new(config, Arc::clone(&store), registry));
    let run_task = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.run().await })
    };

    wait_all_terminal(&store, "frank", 4, Duration::from_secs(5)).await;
    assert_eq!(
        *order.lock().unwrap(),
        vec!["high", "normal-1", "normal-2", "low"]
    );

    dispatcher.shutdown();
    run_task.await.unwrap();
}

struct StagedSlowHandler {
    delay: Duration,
}

#[async_trait]
impl JobHandler for StagedSlowHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, _job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        ctx.stage(30, "Clip record created").await?;
        tokio::time::sleep(self.delay).await;
        ctx.stage(60, "Clip rendered").await?;
        ctx.stage(100, "Clip ready").await?;
        Ok(())
    }
}

/// Cancellation is cooperative: a processing job marked cancelled stays
/// cancelled, and the in-flight handler stops at its next stage boundary
/// without overwriting the terminal status.
#[tokio::test]
async fn cancelled_processing_job_is_not_overwritten() {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(StagedSlowHandler {
        delay: Duration::from_millis(100),
    }));

    let harness = Harness::start(fast_config(1), registry);
    let id = harness
        .service
        .add_job(clip_payload("Cancel me"), "grace", JobPriority::Normal)
        .await
        .unwrap();

    // Wait for the handler to reach its first stage.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let job = harness.store.get(&id).await.unwrap().unwrap();
        if job.status == JobStatus::Processing && job.progress >= 30 {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "handler never started");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    assert!(harness.service.cancel_job(&id, "grace").await.unwrap());

    // Give the handler time to hit the next stage boundary and observe it.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let job = harness.store.get(&id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.progress, 30);
    assert!(job.completed_at.is_some());

    harness.stop().await;
}
