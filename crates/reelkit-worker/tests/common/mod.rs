//! Shared fakes and helpers for worker integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use reelkit_models::{
    format_timecode, ClipFormat, ClipId, ClipPhase, ClipRecord, ContentRecord, HighlightSegment,
    Job, SubtitleSegment, TimeWindow, Transcript, TranscriptLine,
};
use reelkit_services::{
    MediaService, ObjectStorage, RecordStore, RenderedClip, ServiceResult, SourceMedia,
    TranscriptService,
};
use reelkit_store::JobStore;
use reelkit_worker::WorkerConfig;

/// Config with millisecond polling so tests settle quickly.
pub fn fast_config(max_concurrent_jobs: usize) -> WorkerConfig {
    WorkerConfig {
        max_concurrent_jobs,
        busy_poll: Duration::from_millis(5),
        idle_poll: Duration::from_millis(5),
        job_timeout: Duration::from_secs(5),
        shutdown_timeout: Duration::from_secs(1),
        ..WorkerConfig::default()
    }
}

/// Poll until the owner has `expected` jobs and all are terminal.
pub async fn wait_all_terminal(
    store: &Arc<dyn JobStore>,
    owner: &str,
    expected: usize,
    timeout: Duration,
) -> Vec<Job> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let jobs = store.list_by_owner(owner, 100).await.unwrap();
        if jobs.len() == expected && jobs.iter().all(|j| j.is_terminal()) {
            return jobs;
        }
        if tokio::time::Instant::now() > deadline {
            let states: Vec<_> = jobs.iter().map(|j| (j.kind, j.status)).collect();
            panic!("jobs did not settle in time: {states:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub struct FakeMedia;

#[async_trait]
impl MediaService for FakeMedia {
    async fn fetch_source(&self, _url: &str) -> ServiceResult<SourceMedia> {
        Ok(SourceMedia {
            key: "sources/fake".to_string(),
            title: Some("Test Stream".to_string()),
            duration_secs: 3600.0,
        })
    }

    async fn render_clip(
        &self,
        _source_key: &str,
        window: TimeWindow,
        _format: &ClipFormat,
    ) -> ServiceResult<RenderedClip> {
        Ok(RenderedClip {
            video: vec![0u8; 32],
            thumbnail: vec![0u8; 8],
            duration_secs: window.duration_secs(),
        })
    }
}

pub struct FakeTranscripts {
    pub highlight_count: usize,
}

#[async_trait]
impl TranscriptService for FakeTranscripts {
    async fn transcribe(
        &self,
        _source_key: &str,
        window: Option<TimeWindow>,
    ) -> ServiceResult<Transcript> {
        let base = window.map(|w| w.start_secs).unwrap_or(0.0);
        Ok(Transcript::from_lines(vec![
            TranscriptLine::new(base, base + 2.0, "welcome back to the show"),
            TranscriptLine::new(base + 2.2, base + 4.0, "today we ship it"),
        ]))
    }

    async fn find_highlights(
        &self,
        _transcript: &Transcript,
        limit: usize,
    ) -> ServiceResult<Vec<HighlightSegment>> {
        Ok((0..self.highlight_count.min(limit))
            .map(|i| {
                HighlightSegment::new(
                    (i + 1) as u32,
                    format!("Highlight {}", i + 1),
                    format_timecode((i * 60) as f64),
                    format_timecode((i * 60 + 30) as f64),
                    0.9 - i as f32 * 0.05,
                )
            })
            .collect())
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> ServiceResult<String> {
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(format!("https://cdn.test/{key}"))
    }
}

#[derive(Default)]
pub struct FakeRecords {
    pub contents: Mutex<Vec<ContentRecord>>,
    pub clips: Mutex<Vec<ClipRecord>>,
    pub subtitles: Mutex<Vec<(ClipId, Vec<SubtitleSegment>)>>,
}

#[async_trait]
impl RecordStore for FakeRecords {
    async fn create_content(&self, record: &ContentRecord) -> ServiceResult<()> {
        self.contents.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn create_clip(&self, record: &ClipRecord) -> ServiceResult<()> {
        self.clips.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn finalize_clip(
        &self,
        clip_id: &ClipId,
        video_url: &str,
        thumbnail_url: &str,
    ) -> ServiceResult<()> {
        let mut clips = self.clips.lock().unwrap();
        if let Some(clip) = clips.iter_mut().find(|c| &c.id == clip_id) {
            clip.phase = ClipPhase::Ready;
            clip.video_url = Some(video_url.to_string());
            clip.thumbnail_url = Some(thumbnail_url.to_string());
        }
        Ok(())
    }

    async fn replace_subtitles(
        &self,
        clip_id: &ClipId,
        segments: &[SubtitleSegment],
    ) -> ServiceResult<()> {
        let mut subtitles = self.subtitles.lock().unwrap();
        subtitles.retain(|(id, _)| id != clip_id);
        subtitles.push((clip_id.clone(), segments.to_vec()));
        Ok(())
    }
}
