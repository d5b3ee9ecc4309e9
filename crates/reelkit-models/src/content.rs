//! Parent content records written to the record store.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a content record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
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

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parent record for a processed source video. Clip rows reference it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContentRecord {
    pub id: ContentId,

    /// Owning principal
    pub owner: String,

    /// Canonical source URL
    pub source_url: String,

    /// Source title
    pub title: String,

    /// Number of clip jobs fanned out for this content
    pub clip_count: u32,

    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn new(
        owner: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        clip_count: u32,
    ) -> Self {
        Self {
            id: ContentId::new(),
            owner: owner.into(),
            source_url: source_url.into(),
            title: title.into(),
            clip_count,
            created_at: Utc::now(),
        }
    }
}
