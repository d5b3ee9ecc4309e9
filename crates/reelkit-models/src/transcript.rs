//! Transcript types returned by the transcript/analysis collaborator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single timed line of speech.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptLine {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

impl TranscriptLine {
    pub fn new(start_secs: f64, end_secs: f64, text: impl Into<String>) -> Self {
        Self {
            start_secs,
            end_secs,
            text: text.into(),
        }
    }
}

/// A transcript of a media source or a window within one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Full text, for analysis prompts
    pub text: String,

    /// Timed lines, for subtitle segmentation
    pub lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn from_lines(lines: Vec<TranscriptLine>) -> Self {
        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
