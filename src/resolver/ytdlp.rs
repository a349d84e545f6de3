// yt-dlp resolver - runs the native `yt-dlp` binary with --dump-json
//
// Normalises yt-dlp's format list into RawFormat:
// - numeric format ids are YouTube itags; anything else (storyboards,
//   DRC variants) is dropped
// - m4a and mp4 share the mp4 container family
// - quality labels are rebuilt from height/fps ("720p", "1080p60")

use async_trait::async_trait;
use std::process::Command as StdCommand;

use super::errors::ResolveError;
use super::process::run_output_with_timeout;
use super::traits::{RawFormat, RawVideoInfo, Thumbnail, VideoResolver};
use crate::config::ResolverConfig;

/// Resolver backed by the yt-dlp binary
pub struct YtDlpResolver {
    ytdlp_path: String,
    config: ResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let ytdlp_path = config
            .ytdlp_path
            .clone()
            .unwrap_or_else(Self::find_ytdlp);
        Self { ytdlp_path, config }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp",
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout);
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Check if the yt-dlp binary runs at all
    pub fn is_available(&self) -> bool {
        StdCommand::new(&self.ytdlp_path)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.config.timeout_seconds.to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if let Some(path) = &self.config.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.clone());
        }

        if let Some(proxy) = &self.config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        // end of options, so a URL can never be read as a flag
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Parse `--dump-json` output
    pub fn parse_json(stdout: &[u8]) -> Result<RawVideoInfo, ResolveError> {
        let json: serde_json::Value = serde_json::from_slice(stdout)
            .map_err(|e| ResolveError::ProtocolChanged(format!("invalid yt-dlp JSON: {}", e)))?;

        let duration_seconds = json["duration"].as_f64().unwrap_or(0.0).max(0.0) as u64;
        let formats = Self::parse_formats(&json, duration_seconds)?;

        Ok(RawVideoInfo {
            id: json["id"].as_str().unwrap_or("unknown").to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            duration_seconds,
            thumbnails: Self::parse_thumbnails(&json),
            formats,
        })
    }

    fn parse_thumbnails(json: &serde_json::Value) -> Vec<Thumbnail> {
        let mut thumbnails: Vec<Thumbnail> = json["thumbnails"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|t| {
                        Some(Thumbnail {
                            url: t["url"].as_str()?.to_string(),
                            width: t["width"].as_u64().map(|w| w as u32),
                            height: t["height"].as_u64().map(|h| h as u32),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if thumbnails.is_empty() {
            if let Some(url) = json["thumbnail"].as_str() {
                thumbnails.push(Thumbnail {
                    url: url.to_string(),
                    width: None,
                    height: None,
                });
            }
        }

        thumbnails
    }

    fn parse_formats(
        json: &serde_json::Value,
        duration_seconds: u64,
    ) -> Result<Vec<RawFormat>, ResolveError> {
        let formats_array = json["formats"]
            .as_array()
            .ok_or_else(|| ResolveError::ProtocolChanged("no formats array in JSON".to_string()))?;

        let approx_duration_ms = (duration_seconds > 0).then(|| duration_seconds * 1000);

        let formats = formats_array
            .iter()
            .filter_map(|f| {
                let itag: u32 = f["format_id"].as_str()?.parse().ok()?;
                let url = f["url"].as_str()?.to_string();

                let has_video = f["vcodec"].as_str().map_or(false, |v| v != "none");
                let has_audio = f["acodec"].as_str().map_or(false, |a| a != "none");

                let quality_label = if has_video {
                    f["height"]
                        .as_u64()
                        .map(|h| quality_label(h, f["fps"].as_f64()))
                } else {
                    None
                };

                Some(RawFormat {
                    itag,
                    container: f["ext"].as_str().map(container_family),
                    quality_label,
                    audio_bitrate: f["abr"].as_f64(),
                    has_audio,
                    has_video,
                    url,
                    approx_duration_ms,
                })
            })
            .collect();

        Ok(formats)
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[async_trait]
impl VideoResolver for YtDlpResolver {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch_info(&self, url: &str) -> Result<RawVideoInfo, ResolveError> {
        let args = self.build_args(url);
        tracing::debug!(binary = %self.ytdlp_path, args = %args.join(" "), "running yt-dlp");

        // a little headroom over the socket timeout for process start-up
        let process_timeout = u64::from(self.config.timeout_seconds) + 15;
        let output = run_output_with_timeout(&self.ytdlp_path, &args, process_timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::from_ytdlp_stderr(&stderr));
        }

        let info = Self::parse_json(&output.stdout)?;
        tracing::debug!(id = %info.id, formats = info.formats.len(), "yt-dlp returned metadata");
        Ok(info)
    }
}

fn container_family(ext: &str) -> String {
    match ext.to_lowercase().as_str() {
        "mp4" | "m4a" => "mp4".to_string(),
        other => other.to_string(),
    }
}

fn quality_label(height: u64, fps: Option<f64>) -> String {
    match fps {
        Some(fps) if fps > 30.0 => format!("{}p{}", height, fps.round() as u32),
        _ => format!("{}p", height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "abc123",
        "title": "Sample Clip",
        "duration": 212.0,
        "thumbnail": "https://i.ytimg.com/vi/abc123/maxresdefault.jpg",
        "thumbnails": [
            {"url": "https://i.ytimg.com/vi/abc123/default.jpg", "width": 120, "height": 90},
            {"id": "no-url"},
            {"url": "https://i.ytimg.com/vi/abc123/maxresdefault.jpg", "width": 1280, "height": 720}
        ],
        "formats": [
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none", "url": "https://sb"},
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5, "url": "https://a/140"},
            {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360, "fps": 30, "url": "https://v/18"},
            {"format_id": "299", "ext": "mp4", "vcodec": "avc1.64002a", "acodec": "none", "height": 1080, "fps": 60, "url": "https://v/299"},
            {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 140.1, "url": "https://a/251"},
            {"format_id": "22", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a", "height": 720}
        ]
    }"#;

    #[test]
    fn test_parse_metadata() {
        let info = YtDlpResolver::parse_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.title, "Sample Clip");
        assert_eq!(info.duration_seconds, 212);
        assert_eq!(info.thumbnails.len(), 2);
        assert_eq!(
            info.best_thumbnail().unwrap().url,
            "https://i.ytimg.com/vi/abc123/maxresdefault.jpg"
        );
    }

    #[test]
    fn test_parse_formats() {
        let info = YtDlpResolver::parse_json(SAMPLE.as_bytes()).unwrap();
        let itags: Vec<u32> = info.formats.iter().map(|f| f.itag).collect();
        // sb0 has no numeric itag, 22 has no url
        assert_eq!(itags, vec![140, 18, 299, 251]);

        let audio = &info.formats[0];
        assert_eq!(audio.container.as_deref(), Some("mp4"));
        assert!(audio.has_audio && !audio.has_video);
        assert_eq!(audio.quality_label, None);
        assert_eq!(audio.audio_bitrate, Some(129.5));
        assert_eq!(audio.approx_duration_ms, Some(212_000));

        let muxed = &info.formats[1];
        assert!(muxed.has_audio && muxed.has_video);
        assert_eq!(muxed.quality_label.as_deref(), Some("360p"));

        assert_eq!(info.formats[2].quality_label.as_deref(), Some("1080p60"));
        assert_eq!(info.formats[3].container.as_deref(), Some("webm"));
    }

    #[test]
    fn test_single_thumbnail_fallback() {
        let json = r#"{"title": "x", "thumbnail": "https://t/only.jpg", "formats": []}"#;
        let info = YtDlpResolver::parse_json(json.as_bytes()).unwrap();
        assert_eq!(info.thumbnails.len(), 1);
        assert_eq!(info.thumbnails[0].url, "https://t/only.jpg");
        assert_eq!(info.duration_seconds, 0);
    }

    #[test]
    fn test_garbage_is_protocol_changed() {
        let err = YtDlpResolver::parse_json(b"<html>").unwrap_err();
        assert!(matches!(err, ResolveError::ProtocolChanged(_)));

        let err = YtDlpResolver::parse_json(br#"{"title": "no formats"}"#).unwrap_err();
        assert!(matches!(err, ResolveError::ProtocolChanged(_)));
    }

    #[test]
    fn test_args_include_proxy_and_cookies() {
        let resolver = YtDlpResolver::new(
            ResolverConfig::default()
                .with_ytdlp_path(Some("/bin/yt-dlp".to_string()))
                .with_proxy(Some("socks5://127.0.0.1:1080".to_string()))
                .with_cookies_path(Some("/tmp/cookies.txt".to_string())),
        );
        let args = resolver.build_args("https://youtu.be/abc123");

        assert_eq!(resolver.ytdlp_path(), "/bin/yt-dlp");
        assert!(args.windows(2).any(|w| w[0] == "--proxy" && w[1] == "socks5://127.0.0.1:1080"));
        assert!(args.windows(2).any(|w| w[0] == "--cookies" && w[1] == "/tmp/cookies.txt"));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc123"));
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_quality_label() {
        assert_eq!(quality_label(720, Some(30.0)), "720p");
        assert_eq!(quality_label(720, Some(59.94)), "720p60");
        assert_eq!(quality_label(144, None), "144p");
    }
}
