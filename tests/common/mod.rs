// Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use youtube_link_server::resolver::{RawFormat, RawVideoInfo, ResolveError, Thumbnail, VideoResolver};

/// Resolver returning a canned result and counting fetches
pub struct MockResolver {
    result: Mutex<Result<RawVideoInfo, ResolveError>>,
    fetches: AtomicUsize,
}

impl MockResolver {
    pub fn ok(info: RawVideoInfo) -> Self {
        Self {
            result: Mutex::new(Ok(info)),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: ResolveError) -> Self {
        Self {
            result: Mutex::new(Err(err)),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoResolver for MockResolver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_info(&self, _url: &str) -> Result<RawVideoInfo, ResolveError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }
}

pub fn video_format(itag: u32, label: &str) -> RawFormat {
    RawFormat {
        itag,
        container: Some("mp4".to_string()),
        quality_label: Some(label.to_string()),
        audio_bitrate: Some(96.0),
        has_audio: true,
        has_video: true,
        url: format!("https://media.example/video/{}", itag),
        approx_duration_ms: Some(212_000),
    }
}

pub fn audio_format(itag: u32, bitrate: f64) -> RawFormat {
    RawFormat {
        itag,
        container: Some("mp4".to_string()),
        quality_label: None,
        audio_bitrate: Some(bitrate),
        has_audio: true,
        has_video: false,
        url: format!("https://media.example/audio/{}", itag),
        approx_duration_ms: Some(212_000),
    }
}

/// Two muxed formats (720p itag 1, 1080p itag 2) and one audio (128kbps itag 3)
pub fn sample_info() -> RawVideoInfo {
    RawVideoInfo {
        id: "abc123".to_string(),
        title: "Sample Clip".to_string(),
        duration_seconds: 212,
        thumbnails: vec![
            Thumbnail {
                url: "https://i.ytimg.com/vi/abc123/default.jpg".to_string(),
                width: Some(120),
                height: Some(90),
            },
            Thumbnail {
                url: "https://i.ytimg.com/vi/abc123/maxresdefault.jpg".to_string(),
                width: Some(1280),
                height: Some(720),
            },
        ],
        formats: vec![video_format(1, "720p"), video_format(2, "1080p"), audio_format(3, 128.0)],
    }
}
