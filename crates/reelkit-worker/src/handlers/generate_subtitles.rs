//! Subtitle generation: transcribe a clip window, cut styled cues, persist.

use std::sync::Arc;

use async_trait::async_trait;

use reelkit_models::{
    ClipId, Job, JobKind, JobPayload, SubtitleSegment, SubtitleStyle, TimeWindow, Transcript,
};
use reelkit_services::{RecordStore, TranscriptService};

use crate::error::{WorkerError, WorkerResult};
use crate::handler::{JobHandler, StageContext};

/// Maximum cue length for two-line classic captions.
const CLASSIC_MAX_CHARS: usize = 84;
/// Maximum cue length for single-line compact captions.
const COMPACT_MAX_CHARS: usize = 36;
/// A silence longer than this always starts a new cue.
const MAX_GAP_SECS: f64 = 1.5;

/// Produces styled subtitle segments for a clip, replacing any prior set.
pub struct GenerateSubtitlesHandler {
    transcripts: Arc<dyn TranscriptService>,
    records: Arc<dyn RecordStore>,
}

impl GenerateSubtitlesHandler {
    pub fn new(transcripts: Arc<dyn TranscriptService>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            transcripts,
            records,
        }
    }
}

#[async_trait]
impl JobHandler for GenerateSubtitlesHandler {
    fn kind(&self) -> JobKind {
        JobKind::GenerateSubtitles
    }

    async fn execute(&self, job: &Job, ctx: &StageContext) -> WorkerResult<()> {
        let JobPayload::GenerateSubtitles(payload) = &job.payload else {
            return Err(WorkerError::job_failed(
                "payload does not match generate_subtitles",
            ));
        };

        let window = payload.window()?;
        let transcript = self
            .transcripts
            .transcribe(&payload.source_key, Some(window))
            .await?;
        ctx.stage(20, "Clip transcript ready").await?;

        let segments = segment_transcript(&transcript, window, payload.style);
        ctx.stage(60, &format!("Styled {} subtitle segments", segments.len()))
            .await?;

        self.records
            .replace_subtitles(&ClipId::from_string(payload.clip_id.as_str()), &segments)
            .await?;
        ctx.stage(80, "Subtitle segments persisted").await?;

        ctx.stage(100, "Subtitles ready").await?;
        Ok(())
    }
}

/// Cut transcript lines into cues. Times are rebased to the clip start.
pub fn segment_transcript(
    transcript: &Transcript,
    window: TimeWindow,
    style: SubtitleStyle,
) -> Vec<SubtitleSegment> {
    let offset = window.start_secs;

    match style {
        SubtitleStyle::Karaoke => karaoke_segments(transcript, offset),
        SubtitleStyle::Classic => merged_segments(transcript, offset, CLASSIC_MAX_CHARS),
        SubtitleStyle::Compact => merged_segments(transcript, offset, COMPACT_MAX_CHARS),
    }
}

/// One cue per word; each line's span is divided evenly among its words.
fn karaoke_segments(transcript: &Transcript, offset: f64) -> Vec<SubtitleSegment> {
    let mut segments = Vec::new();
    for line in &transcript.lines {
        let words: Vec<&str> = line.text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let step = (line.end_secs - line.start_secs).max(0.0) / words.len() as f64;
        for (i, word) in words.iter().enumerate() {
            let start = line.start_secs + step * i as f64;
            segments.push(SubtitleSegment::new(
                segments.len() as u32,
                rebase(start, offset),
                rebase(start + step, offset),
                *word,
            ));
        }
    }
    segments
}

/// Merge consecutive lines into cues up to `max_chars`, breaking on long
/// silences.
fn merged_segments(transcript: &Transcript, offset: f64, max_chars: usize) -> Vec<SubtitleSegment> {
    struct Cue {
        start: f64,
        end: f64,
        text: String,
    }

    let mut cues: Vec<Cue> = Vec::new();
    for line in &transcript.lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }

        match cues.last_mut() {
            Some(cue)
                if cue.text.len() + 1 + text.len() <= max_chars
                    && line.start_secs - cue.end <= MAX_GAP_SECS =>
            {
                cue.text.push(' ');
                cue.text.push_str(text);
                cue.end = line.end_secs;
            }
            _ => cues.push(Cue {
                start: line.start_secs,
                end: line.end_secs,
                text: text.to_string(),
            }),
        }
    }

    cues.into_iter()
        .enumerate()
        .map(|(i, cue)| {
            SubtitleSegment::new(i as u32, rebase(cue.start, offset), rebase(cue.end, offset), cue.text)
        })
        .collect()
}

fn rebase(absolute_secs: f64, offset: f64) -> f64 {
    (absolute_secs - offset).max(0.0)
}
