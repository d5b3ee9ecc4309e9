//! Single-clip rendering: record, render, upload, finalize.

use std::sync::Arc;

use async_trait::async_trait;

use reelkit_models::{ClipRecord, ContentId, Job, JobKind, JobPayload};
use reelkit_services::{MediaService, ObjectStorage, RecordStore};

use crate::error::{WorkerError, WorkerResult};
use crate::handler::{JobHandler, StageContext};

/// Renders one highlight window out of an already-staged source and uploads
/// the artifacts.
pub struct GenerateClipHandler {
    media: Arc<dyn MediaService>,
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
}

impl GenerateClipHandler {
    pub fn new(
        media: Arc<dyn MediaService>,
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            media,
            storage,
            records,
        }
    }
}

#[async_trait]
impl JobHandler for GenerateClipHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateClip
    }

    async fn execute(&self, job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        let JobPayload::GenerateClip(payload) = &job.payload else {
            return Err(WorkerError::job_failed("payload does not match generate_clip"));
        };

        ctx.stage(10, "Preparing clip workspace").await?;
        let window = payload.window()?;

        let clip = ClipRecord::processing(
            ContentId::from_string(payload.content_id.as_str()),
            ctx.owner(),
            payload.title.as_str(),
            payload.start.as_str(),
            payload.end.as_str(),
            payload.format,
        );
        self.records.create_clip(&clip).await?;
        ctx.stage(30, "Clip record created").await?;

        let rendered = self
            .media
            .render_clip(&payload.source_key, window, &payload.format)
            .await?;
        ctx.stage(60, "Clip rendered").await?;

        let video_key = format!("clips/{}/{}.mp4", ctx.owner(), clip.id);
        let thumbnail_key = format!("clips/{}/{}.jpg", ctx.owner(), clip.id);
        let video_url = self
            .storage
            .put_object(&video_key, rendered.video, "video/mp4")
            .await?;
        let thumbnail_url = self
            .storage
            .put_object(&thumbnail_key, rendered.thumbnail, "image/jpeg")
            .await?;
        ctx.stage(80, "Artifacts uploaded").await?;

        self.records
            .finalize_clip(&clip.id, &video_url, &thumbnail_url)
            .await?;
        ctx.stage(100, "Clip ready").await?;
        Ok(())
    }
}
