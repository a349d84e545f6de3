// YouTube URL validity check
//
// Accepts the usual watch / short-link / shorts / embed / live forms on the
// known YouTube hosts and pulls out the video id.

use regex::Regex;
use url::Url;

lazy_static::lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

const SHORT_HOST: &str = "youtu.be";

/// Path prefixes that carry the id as the next segment
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// Extract the video id from a YouTube URL, or `None` if the URL is not one.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let host = parsed.host_str()?.to_lowercase();
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let candidate: Option<String> = if host == SHORT_HOST {
        segments.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => {
                segments.next().map(str::to_string)
            }
            _ => None,
        }
    } else {
        None
    };

    let candidate = candidate?;
    VIDEO_ID_RE.is_match(&candidate).then_some(candidate)
}

pub fn is_valid_youtube_url(raw: &str) -> bool {
    extract_video_id(raw).is_some()
}
