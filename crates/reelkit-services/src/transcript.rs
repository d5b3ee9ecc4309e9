//! Transcript and content-analysis service port.

use async_trait::async_trait;

use reelkit_models::{HighlightSegment, TimeWindow, Transcript};

use crate::error::ServiceResult;

/// Produces transcripts and ranked highlight suggestions.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Transcribe a staged source, optionally bounded to a window.
    async fn transcribe(
        &self,
        source_key: &str,
        window: Option<TimeWindow>,
    ) -> ServiceResult<Transcript>;

    /// Rank the most clip-worthy moments in a transcript, best first.
    /// Returns at most `limit` segments.
    async fn find_highlights(
        &self,
        transcript: &Transcript,
        limit: usize,
    ) -> ServiceResult<Vec<HighlightSegment>>;
}
