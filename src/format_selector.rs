// FormatSelector - turns resolver output into the response format list
//
// Rules:
// - muxed video+audio streams in the mp4 family that carry a quality label,
//   best resolution first
// - audio-only streams in the mp4 family, labelled by rounded bitrate,
//   highest bitrate first
// - video group before audio group, then first occurrence of each itag wins

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{StreamFormat, VideoInfo};
use crate::resolver::{FormatCategory, RawFormat, RawVideoInfo, VideoResolver};

/// Container family both groups are restricted to
pub const CONTAINER_FAMILY: &str = "mp4";

/// Label used for audio-only streams from the mp4 family
pub const AUDIO_TYPE_LABEL: &str = "M4A";

lazy_static::lazy_static! {
    static ref LEADING_NUMBER_RE: Regex = Regex::new(r"^\d+").unwrap();
}

pub struct FormatSelector;

impl FormatSelector {
    /// Shape a resolver payload into the response model
    pub fn build_video_info(resolver: &dyn VideoResolver, raw: &RawVideoInfo) -> VideoInfo {
        let thumbnail_url = raw
            .best_thumbnail()
            .map(|t| t.url.clone())
            .unwrap_or_default();

        VideoInfo {
            title: raw.title.clone(),
            thumbnail_url,
            duration_seconds: raw.duration_seconds,
            formats: Self::build_stream_formats(resolver, &raw.formats),
        }
    }

    /// Video formats then audio formats, each sorted best first, unique by itag
    pub fn build_stream_formats(
        resolver: &dyn VideoResolver,
        formats: &[RawFormat],
    ) -> Vec<StreamFormat> {
        let video = Self::video_formats(&resolver.filter_formats(formats, FormatCategory::VideoAndAudio));
        let audio = Self::audio_formats(&resolver.filter_formats(formats, FormatCategory::AudioOnly));

        tracing::debug!(
            video = video.len(),
            audio = audio.len(),
            raw = formats.len(),
            "selected {} and {} formats",
            FormatCategory::VideoAndAudio,
            FormatCategory::AudioOnly
        );

        Self::dedup_by_itag(video.into_iter().chain(audio))
    }

    fn video_formats(formats: &[RawFormat]) -> Vec<StreamFormat> {
        let mut selected: Vec<(u32, StreamFormat)> = formats
            .iter()
            .filter(|f| Self::in_container_family(f))
            .filter_map(|f| {
                let label = f.quality_label.as_ref()?;
                let container = f.container.as_deref().unwrap_or(CONTAINER_FAMILY);
                Some((
                    Self::resolution_of(label),
                    StreamFormat {
                        quality: label.clone(),
                        format_type: container.to_uppercase(),
                        url: f.url.clone(),
                        itag: f.itag,
                        has_audio: f.has_audio,
                        has_video: f.has_video,
                        approx_duration_ms: f.approx_duration_ms,
                    },
                ))
            })
            .collect();

        selected.sort_by(|a, b| b.0.cmp(&a.0));
        selected.into_iter().map(|(_, f)| f).collect()
    }

    fn audio_formats(formats: &[RawFormat]) -> Vec<StreamFormat> {
        let mut selected: Vec<(f64, StreamFormat)> = formats
            .iter()
            .filter(|f| Self::in_container_family(f))
            .filter_map(|f| {
                let bitrate = f.audio_bitrate.filter(|b| b.is_finite())?;
                Some((
                    bitrate,
                    StreamFormat {
                        quality: format!("{}kbps", bitrate.round() as u64),
                        format_type: AUDIO_TYPE_LABEL.to_string(),
                        url: f.url.clone(),
                        itag: f.itag,
                        has_audio: f.has_audio,
                        has_video: f.has_video,
                        approx_duration_ms: f.approx_duration_ms,
                    },
                ))
            })
            .collect();

        selected.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        selected.into_iter().map(|(_, f)| f).collect()
    }

    fn in_container_family(format: &RawFormat) -> bool {
        format
            .container
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(CONTAINER_FAMILY))
    }

    /// Numeric prefix of a quality label ("1080p60" -> 1080), 0 if none
    pub fn resolution_of(label: &str) -> u32 {
        LEADING_NUMBER_RE
            .find(label)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    fn dedup_by_itag(formats: impl IntoIterator<Item = StreamFormat>) -> Vec<StreamFormat> {
        let mut seen = HashSet::new();
        formats
            .into_iter()
            .filter(|f| seen.insert(f.itag))
            .collect()
    }
}
