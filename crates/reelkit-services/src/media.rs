//! Media transformation service port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use reelkit_models::{ClipFormat, TimeWindow};

use crate::error::ServiceResult;

/// A fetched source, addressable by storage key for later render calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMedia {
    /// Storage key under which the source was staged
    pub key: String,

    /// Title reported by the source, when available
    pub title: Option<String>,

    pub duration_secs: f64,
}

/// A rendered clip plus its thumbnail, ready for upload.
#[derive(Debug, Clone)]
pub struct RenderedClip {
    pub video: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub duration_secs: f64,
}

/// Transforms source media into clips. Implementations wrap the actual
/// download/transcode tooling; the orchestration core only sees this
/// surface.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Stage the source behind `url` and return a reference to it. Child
    /// jobs render from the returned key without re-fetching.
    async fn fetch_source(&self, url: &str) -> ServiceResult<SourceMedia>;

    /// Cut and format the given window out of a staged source.
    async fn render_clip(
        &self,
        source_key: &str,
        window: TimeWindow,
        format: &ClipFormat,
    ) -> ServiceResult<RenderedClip>;
}
