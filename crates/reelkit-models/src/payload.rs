//! Typed job payloads.
//!
//! Payloads are opaque to the dispatcher; each handler interprets the
//! variant matching its kind. Shape checks run synchronously at submission
//! so malformed work never enters the queue.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::format::ClipFormat;
use crate::job::JobKind;
use crate::subtitle::SubtitleStyle;
use crate::timecode::{TimeWindow, TimecodeError};

/// Payload validation failure, surfaced to the submitter.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid payload: {0}")]
    Validation(String),

    #[error(transparent)]
    Timecode(#[from] TimecodeError),
}

fn default_max_clips() -> u32 {
    5
}

/// Payload for a `process_video` job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ProcessVideoPayload {
    /// Source media URL to analyze
    #[validate(url(message = "source_url must be a valid URL"))]
    pub source_url: String,

    /// Optional title override; the media service's title is used otherwise
    #[validate(length(min = 1, max = 200))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Upper bound on highlight fan-out
    #[validate(range(min = 1, max = 20))]
    #[serde(default = "default_max_clips")]
    pub max_clips: u32,

    /// Optional analysis instructions forwarded to the transcript service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_instructions: Option<String>,
}

impl ProcessVideoPayload {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title: None,
            max_clips: default_max_clips(),
            prompt_instructions: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_max_clips(mut self, max_clips: u32) -> Self {
        self.max_clips = max_clips;
        self
    }
}

/// Payload for a `generate_clip` job.
///
/// Carries a reference to the already-fetched source media so child jobs
/// never re-download what the parent acquired.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerateClipPayload {
    /// Parent content record
    #[validate(length(min = 1))]
    pub content_id: String,

    /// Storage key of the fetched source media
    #[validate(length(min = 1))]
    pub source_key: String,

    /// Clip title
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Highlight start timecode
    pub start: String,

    /// Highlight end timecode
    pub end: String,

    /// Target formatting options
    #[serde(default)]
    pub format: ClipFormat,
}

impl GenerateClipPayload {
    pub fn new(
        content_id: impl Into<String>,
        source_key: impl Into<String>,
        title: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            source_key: source_key.into(),
            title: title.into(),
            start: start.into(),
            end: end.into(),
            format: ClipFormat::default(),
        }
    }

    pub fn with_format(mut self, format: ClipFormat) -> Self {
        self.format = format;
        self
    }

    /// The validated highlight window.
    pub fn window(&self) -> Result<TimeWindow, TimecodeError> {
        TimeWindow::from_timecodes(&self.start, &self.end)
    }
}

/// Payload for a `generate_subtitles` job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GenerateSubtitlesPayload {
    /// Clip record the segments belong to
    #[validate(length(min = 1))]
    pub clip_id: String,

    /// Storage key of the fetched source media
    #[validate(length(min = 1))]
    pub source_key: String,

    /// Clip start timecode within the source
    pub start: String,

    /// Clip end timecode within the source
    pub end: String,

    /// Subtitle styling preset
    #[serde(default)]
    pub style: SubtitleStyle,
}

impl GenerateSubtitlesPayload {
    pub fn new(
        clip_id: impl Into<String>,
        source_key: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            source_key: source_key.into(),
            start: start.into(),
            end: end.into(),
            style: SubtitleStyle::default(),
        }
    }

    pub fn with_style(mut self, style: SubtitleStyle) -> Self {
        self.style = style;
        self
    }

    pub fn window(&self) -> Result<TimeWindow, TimecodeError> {
        TimeWindow::from_timecodes(&self.start, &self.end)
    }
}

/// Generic payload wrapper stored on the job record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobPayload {
    ProcessVideo(ProcessVideoPayload),
    GenerateClip(GenerateClipPayload),
    GenerateSubtitles(GenerateSubtitlesPayload),
}

impl JobPayload {
    /// The job kind this payload belongs to.
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::ProcessVideo(_) => JobKind::ProcessVideo,
            JobPayload::GenerateClip(_) => JobKind::GenerateClip,
            JobPayload::GenerateSubtitles(_) => JobKind::GenerateSubtitles,
        }
    }

    /// Run shape checks; rejected payloads never enter the queue.
    pub fn validate(&self) -> Result<(), PayloadError> {
        let shape = match self {
            JobPayload::ProcessVideo(p) => p.validate(),
            JobPayload::GenerateClip(p) => p.validate(),
            JobPayload::GenerateSubtitles(p) => p.validate(),
        };
        shape.map_err(|e| PayloadError::Validation(e.to_string()))?;

        // Cross-field checks the derive cannot express.
        match self {
            JobPayload::ProcessVideo(_) => {}
            JobPayload::GenerateClip(p) => {
                p.window()?;
            }
            JobPayload::GenerateSubtitles(p) => {
                p.window()?;
            }
        }
        Ok(())
    }
}
