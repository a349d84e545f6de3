// Wire models shared by the handler and the client

use serde::{Deserialize, Serialize};

/// One downloadable stream as returned to the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    /// Resolution label ("1080p") or bitrate ("128kbps")
    pub quality: String,
    /// Container label, uppercase ("MP4", "M4A")
    #[serde(rename = "type")]
    pub format_type: String,
    pub url: String,
    pub itag: u32,
    pub has_audio: bool,
    pub has_video: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_duration_ms: Option<u64>,
}

impl StreamFormat {
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }
}

/// Shaped video metadata; lives for one request
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub duration_seconds: u64,
    /// Unique by itag, video before audio, each group best first
    pub formats: Vec<StreamFormat>,
}

/// Body of a successful `/api/getVideo` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub success: bool,
    pub title: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
    /// Seconds
    pub duration: u64,
}

impl From<VideoInfo> for VideoResponse {
    fn from(info: VideoInfo) -> Self {
        Self {
            success: true,
            title: info.title,
            thumbnail_url: info.thumbnail_url,
            formats: info.formats,
            duration: info.duration_seconds,
        }
    }
}

/// Body of every failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
