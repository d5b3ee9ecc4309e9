//! Record store port.
//!
//! Relational persistence for content/clip/subtitle rows. The orchestration
//! core writes to it as a side effect of handler stages but does not own its
//! schema.

use async_trait::async_trait;

use reelkit_models::{ClipId, ClipRecord, ContentRecord, SubtitleSegment};

use crate::error::ServiceResult;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the parent content row for a processed source.
    async fn create_content(&self, record: &ContentRecord) -> ServiceResult<()>;

    /// Create a clip row, typically in the `Processing` phase.
    async fn create_clip(&self, record: &ClipRecord) -> ServiceResult<()>;

    /// Mark a clip ready with its final artifact URLs.
    async fn finalize_clip(
        &self,
        clip_id: &ClipId,
        video_url: &str,
        thumbnail_url: &str,
    ) -> ServiceResult<()>;

    /// Replace all subtitle segments for a clip with the given set.
    async fn replace_subtitles(
        &self,
        clip_id: &ClipId,
        segments: &[SubtitleSegment],
    ) -> ServiceResult<()>;
}
