//! Source video processing: analyze a video and fan out clip jobs.

use std::sync::Arc;

use async_trait::async_trait;

use reelkit_models::{
    ClipFormat, ContentRecord, GenerateClipPayload, Job, JobKind, JobPayload, JobPriority,
};
use reelkit_services::{MediaService, RecordStore, TranscriptService};

use crate::error::{WorkerError, WorkerResult};
use crate::handler::{JobHandler, StageContext};

/// Orchestration handler: fetch the source once, find the highlights, write
/// the parent content record, then enqueue one `generate_clip` child per
/// highlight. Children carry the staged source key so nothing is fetched
/// twice.
pub struct ProcessVideoHandler {
    media: Arc<dyn MediaService>,
    transcripts: Arc<dyn TranscriptService>,
    records: Arc<dyn RecordStore>,
}

impl ProcessVideoHandler {
    pub fn new(
        media: Arc<dyn MediaService>,
        transcripts: Arc<dyn TranscriptService>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            media,
            transcripts,
            records,
        }
    }
}

#[async_trait]
impl JobHandler for ProcessVideoHandler {
    fn kind(&self) -> JobKind {
        JobKind::ProcessVideo
    }

    async fn execute(&self, job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        let JobPayload::ProcessVideo(payload) = &job.payload else {
            return Err(WorkerError::job_failed("payload does not match process_video"));
        };

        ctx.stage(10, "Preparing video workspace").await?;

        let source = self.media.fetch_source(&payload.source_url).await?;
        ctx.stage(20, "Source media fetched").await?;

        let transcript = self.transcripts.transcribe(&source.key, None).await?;
        ctx.stage(40, "Transcript ready").await?;

        let highlights = self
            .transcripts
            .find_highlights(&transcript, payload.max_clips as usize)
            .await?;
        ctx.stage(60, &format!("Found {} highlight segments", highlights.len()))
            .await?;

        let title = payload
            .title
            .clone()
            .or_else(|| source.title.clone())
            .unwrap_or_else(|| payload.source_url.clone());
        let content = ContentRecord::new(
            ctx.owner(),
            payload.source_url.as_str(),
            title,
            highlights.len() as u32,
        );
        self.records.create_content(&content).await?;
        ctx.stage(80, "Content record created").await?;

        let mut queued = 0u32;
        for highlight in &highlights {
            let clip_payload = GenerateClipPayload::new(
                content.id.as_str(),
                source.key.as_str(),
                highlight.title.as_str(),
                highlight.start.as_str(),
                highlight.end.as_str(),
            )
            .with_format(ClipFormat::vertical());

            match ctx
                .spawn_child(JobPayload::GenerateClip(clip_payload), JobPriority::Normal)
                .await
            {
                Ok(_) => queued += 1,
                Err(WorkerError::Payload(e)) => {
                    // Analysis occasionally emits an unusable window; skip
                    // the segment rather than failing the whole video.
                    ctx.warn(&format!(
                        "skipping highlight {} ({e})",
                        highlight.id
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        ctx.stage(100, &format!("Queued {queued} clip jobs")).await?;
        Ok(())
    }
}
