//! Shared data models for the ReelKit backend.
//!
//! Job records and payloads, highlight/transcript analysis types, and the
//! content/clip/subtitle rows written to the record store.

pub mod clip;
pub mod content;
pub mod format;
pub mod highlight;
pub mod job;
pub mod payload;
pub mod subtitle;
pub mod timecode;
pub mod transcript;

pub use clip::{ClipId, ClipPhase, ClipRecord};
pub use content::{ContentId, ContentRecord};
pub use format::{AspectRatio, ClipFormat};
pub use highlight::HighlightSegment;
pub use job::{Job, JobId, JobKind, JobPriority, JobStatus};
pub use payload::{
    GenerateClipPayload, GenerateSubtitlesPayload, JobPayload, PayloadError, ProcessVideoPayload,
};
pub use subtitle::{SubtitleSegment, SubtitleStyle};
pub use timecode::{format_timecode, parse_timecode, TimeWindow, TimecodeError};
pub use transcript::{Transcript, TranscriptLine};
