//! Highlight segments produced by transcript analysis.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timecode::parse_timecode;

/// A candidate clip moment detected in a transcript, ranked by score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlightSegment {
    /// 1-indexed ID within the analysis run
    pub id: u32,

    /// Suggested clip title
    pub title: String,

    /// Start timecode (`HH:MM:SS` or `MM:SS`)
    pub start: String,

    /// End timecode
    pub end: String,

    /// Ranking score in `0.0..=1.0`, higher is better
    pub score: f32,

    /// Why this moment was selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HighlightSegment {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start: start.into(),
            end: end.into(),
            score,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Segment duration in whole seconds, zero if the timecodes do not parse.
    pub fn duration_secs(&self) -> u32 {
        match (parse_timecode(&self.start), parse_timecode(&self.end)) {
            (Ok(start), Ok(end)) => (end - start).max(0.0) as u32,
            _ => 0,
        }
    }
}
