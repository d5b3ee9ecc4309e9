//! Output formatting options for rendered clips.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target aspect ratio for a rendered clip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 9:16 vertical, the short-form default
    #[default]
    Vertical916,
    /// 1:1 square
    Square,
    /// 16:9 original-orientation
    Wide169,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Vertical916 => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Wide169 => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formatting options passed through to the media transformation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ClipFormat {
    /// Target aspect ratio
    #[serde(default)]
    pub aspect: AspectRatio,

    /// Burn subtitles into the rendered video
    #[serde(default)]
    pub burn_subtitles: bool,
}

impl ClipFormat {
    pub fn vertical() -> Self {
        Self {
            aspect: AspectRatio::Vertical916,
            burn_subtitles: false,
        }
    }

    pub fn with_burned_subtitles(mut self) -> Self {
        self.burn_subtitles = true;
        self
    }
}
