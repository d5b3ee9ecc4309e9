//! Clip records written to the record store.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::content::ContentId;
use crate::format::ClipFormat;

/// Unique identifier for a clip record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clip record lifecycle, independent of the job that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipPhase {
    /// Render in progress
    #[default]
    Processing,
    /// Artifacts uploaded, URLs set
    Ready,
    /// Render abandoned
    Failed,
}

impl ClipPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipPhase::Processing => "processing",
            ClipPhase::Ready => "ready",
            ClipPhase::Failed => "failed",
        }
    }
}

/// A single rendered clip row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipRecord {
    pub id: ClipId,

    /// Parent content record
    pub content_id: ContentId,

    /// Owning principal
    pub owner: String,

    pub title: String,

    /// Clip bounds within the source, as timecodes
    pub start: String,
    pub end: String,

    /// Formatting the clip was rendered with
    #[serde(default)]
    pub format: ClipFormat,

    #[serde(default)]
    pub phase: ClipPhase,

    /// Final video artifact URL, set when ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Thumbnail artifact URL, set when ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClipRecord {
    /// Create a clip row in the `Processing` phase.
    pub fn processing(
        content_id: ContentId,
        owner: impl Into<String>,
        title: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        format: ClipFormat,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClipId::new(),
            content_id,
            owner: owner.into(),
            title: title.into(),
            start: start.into(),
            end: end.into(),
            format,
            phase: ClipPhase::Processing,
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the clip ready with its final artifact URLs.
    pub fn finalize(&mut self, video_url: impl Into<String>, thumbnail_url: impl Into<String>) {
        self.phase = ClipPhase::Ready;
        self.video_url = Some(video_url.into());
        self.thumbnail_url = Some(thumbnail_url.into());
        self.updated_at = Utc::now();
    }
}
