// VideoResolver trait and raw metadata types

use async_trait::async_trait;
use std::fmt;

use super::errors::ResolveError;
use super::youtube_url::is_valid_youtube_url;

/// Stream category used by `filter_formats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCategory {
    /// Muxed streams carrying both video and audio
    VideoAndAudio,
    /// Audio without a video track
    AudioOnly,
}

impl FormatCategory {
    pub fn matches(&self, format: &RawFormat) -> bool {
        match self {
            Self::VideoAndAudio => format.has_video && format.has_audio,
            Self::AudioOnly => format.has_audio && !format.has_video,
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoAndAudio => write!(f, "videoandaudio"),
            Self::AudioOnly => write!(f, "audioonly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One stream variant as reported by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct RawFormat {
    /// Platform format identifier (e.g. 18, 22, 140)
    pub itag: u32,
    /// Container family, lowercase (mp4, webm)
    pub container: Option<String>,
    /// Resolution label (e.g. "720p", "1080p60"), video streams only
    pub quality_label: Option<String>,
    /// Audio bitrate in kbps
    pub audio_bitrate: Option<f64>,
    pub has_audio: bool,
    pub has_video: bool,
    /// Direct media URL
    pub url: String,
    pub approx_duration_ms: Option<u64>,
}

/// Video metadata as reported by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct RawVideoInfo {
    pub id: String,
    pub title: String,
    pub duration_seconds: u64,
    /// Ordered worst to best
    pub thumbnails: Vec<Thumbnail>,
    pub formats: Vec<RawFormat>,
}

impl RawVideoInfo {
    /// Last thumbnail, which resolvers list as the largest
    pub fn best_thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnails.last()
    }
}

/// Narrow interface over whatever extracts stream metadata from a URL.
///
/// Swapping implementations must not change the shape of what the HTTP
/// handler returns, so adapters are responsible for normalising their
/// output into `RawVideoInfo` and for tagging their failures.
#[async_trait]
pub trait VideoResolver: Send + Sync {
    /// Name of the resolver (for logging)
    fn name(&self) -> &'static str;

    /// Cheap, offline check that the URL is something this resolver accepts
    fn validate_url(&self, url: &str) -> bool {
        is_valid_youtube_url(url)
    }

    /// Fetch title, thumbnails, duration and every available stream
    async fn fetch_info(&self, url: &str) -> Result<RawVideoInfo, ResolveError>;

    /// Keep only the formats belonging to `category`, preserving order
    fn filter_formats(&self, formats: &[RawFormat], category: FormatCategory) -> Vec<RawFormat> {
        formats
            .iter()
            .filter(|f| category.matches(f))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    #[async_trait]
    impl VideoResolver for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn fetch_info(&self, _url: &str) -> Result<RawVideoInfo, ResolveError> {
            Err(ResolveError::Unknown("offline".to_string()))
        }
    }

    fn format(itag: u32, has_video: bool, has_audio: bool) -> RawFormat {
        RawFormat {
            itag,
            container: Some("mp4".to_string()),
            quality_label: None,
            audio_bitrate: None,
            has_audio,
            has_video,
            url: format!("https://media.example/{}", itag),
            approx_duration_ms: None,
        }
    }

    #[test]
    fn test_filter_by_category() {
        let formats = vec![
            format(18, true, true),
            format(137, true, false),
            format(140, false, true),
            format(22, true, true),
        ];

        let muxed: Vec<u32> = Offline
            .filter_formats(&formats, FormatCategory::VideoAndAudio)
            .iter()
            .map(|f| f.itag)
            .collect();
        assert_eq!(muxed, vec![18, 22]);

        let audio: Vec<u32> = Offline
            .filter_formats(&formats, FormatCategory::AudioOnly)
            .iter()
            .map(|f| f.itag)
            .collect();
        assert_eq!(audio, vec![140]);
    }

    #[test]
    fn test_default_validation() {
        assert!(Offline.validate_url("https://youtu.be/abc123"));
        assert!(!Offline.validate_url("https://example.com/watch?v=abc123"));
    }

    #[test]
    fn test_best_thumbnail_is_last() {
        let info = RawVideoInfo {
            id: "abc".to_string(),
            title: "t".to_string(),
            duration_seconds: 1,
            thumbnails: vec![
                Thumbnail { url: "small".to_string(), width: Some(120), height: Some(90) },
                Thumbnail { url: "large".to_string(), width: Some(1280), height: Some(720) },
            ],
            formats: Vec::new(),
        };
        assert_eq!(info.best_thumbnail().map(|t| t.url.as_str()), Some("large"));
    }
}
