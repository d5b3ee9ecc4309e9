//! Subtitle segment and styling types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subtitle styling preset. Drives how transcript lines are cut into cues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleStyle {
    /// Two-line cues, readable pacing
    #[default]
    Classic,
    /// Short single-line cues
    Compact,
    /// One word per cue
    Karaoke,
}

impl SubtitleStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleStyle::Classic => "classic",
            SubtitleStyle::Compact => "compact",
            SubtitleStyle::Karaoke => "karaoke",
        }
    }
}

impl fmt::Display for SubtitleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single timed subtitle cue, relative to the clip start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleSegment {
    /// 0-indexed position within the clip
    pub index: u32,

    pub start_secs: f64,
    pub end_secs: f64,

    pub text: String,
}

impl SubtitleSegment {
    pub fn new(index: u32, start_secs: f64, end_secs: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_secs,
            end_secs,
            text: text.into(),
        }
    }
}
