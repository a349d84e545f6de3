// Error types for resolver adapters
//
// Every adapter reports failures as one of five tagged causes. The handler
// only ever looks at the tag; the detail string is for server logs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Private, age-gated, members-only or region-locked video
    #[error("access restricted: {0}")]
    RestrictedAccess(String),

    /// Timeout, DNS failure, refused connection
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Video removed, unknown id, or URL the resolver does not recognise
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream response no longer matches what the resolver understands
    #[error("upstream protocol changed: {0}")]
    ProtocolChanged(String),

    /// Everything else, including a missing resolver binary
    #[error("unknown resolver failure: {0}")]
    Unknown(String),
}

impl ResolveError {
    /// Message shown to the end user. Never includes the raw detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RestrictedAccess(_) => {
                "This video might be private, age-restricted, or unavailable in your region."
            }
            Self::NetworkUnreachable(_) => {
                "Could not reach YouTube. Please check your connection and try again."
            }
            Self::NotFound(_) => "Video not found. Please check the URL and try again.",
            Self::ProtocolChanged(_) => {
                "YouTube has changed something on its end. Please try again later."
            }
            Self::Unknown(_) => "Failed to fetch video information. Please try again later.",
        }
    }

    /// Short tag for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RestrictedAccess(_) => "restricted_access",
            Self::NetworkUnreachable(_) => "network_unreachable",
            Self::NotFound(_) => "not_found",
            Self::ProtocolChanged(_) => "protocol_changed",
            Self::Unknown(_) => "unknown",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::RestrictedAccess(d)
            | Self::NetworkUnreachable(d)
            | Self::NotFound(d)
            | Self::ProtocolChanged(d)
            | Self::Unknown(d) => d,
        }
    }

    /// Tag a yt-dlp stderr dump. Only adapters call this; the handler never
    /// inspects free text.
    pub fn from_ytdlp_stderr(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        let detail = stderr.trim().to_string();

        let restricted = [
            "private",
            "sign in to confirm your age",
            "age-restricted",
            "age restricted",
            "inappropriate for some users",
            "available in your country",
            "geo restricted",
            "geo-restricted",
            "members only",
            "members-only",
            "join this channel",
            "requires payment",
        ];
        if restricted.iter().any(|p| lower.contains(p)) {
            return Self::RestrictedAccess(detail);
        }

        let not_found = [
            "video unavailable",
            "this video has been removed",
            "http error 404",
            "unsupported url",
            "is not a valid url",
            "incomplete youtube id",
            "does not exist",
        ];
        if not_found.iter().any(|p| lower.contains(p)) {
            return Self::NotFound(detail);
        }

        let network = [
            "timed out",
            "timeout",
            "connection refused",
            "connection reset",
            "network is unreachable",
            "name or service not known",
            "temporary failure in name resolution",
            "failed to resolve",
            "unable to download webpage",
        ];
        if network.iter().any(|p| lower.contains(p)) {
            return Self::NetworkUnreachable(detail);
        }

        let changed = [
            "please report this issue",
            "update to the latest version",
            "unable to extract",
            "signature extraction failed",
            "nsig extraction failed",
        ];
        if changed.iter().any(|p| lower.contains(p)) {
            return Self::ProtocolChanged(detail);
        }

        Self::Unknown(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_is_restricted() {
        let err = ResolveError::from_ytdlp_stderr("ERROR: [youtube] abc: Private video. Sign in if you've been granted access");
        assert!(matches!(err, ResolveError::RestrictedAccess(_)));
        assert_eq!(
            err.user_message(),
            "This video might be private, age-restricted, or unavailable in your region."
        );
    }

    #[test]
    fn test_any_private_wording_is_restricted() {
        for stderr in [
            "ERROR: [youtube] abc123: This video has been made private",
            "ERROR: [youtube] abc123: Video unavailable. This video is private",
        ] {
            let err = ResolveError::from_ytdlp_stderr(stderr);
            assert_eq!(err.kind(), "restricted_access", "{}", stderr);
        }
    }

    #[test]
    fn test_region_block_is_restricted() {
        let err = ResolveError::from_ytdlp_stderr(
            "ERROR: [youtube] abc123: Video unavailable. The uploader has not made this video available in your country",
        );
        assert!(matches!(err, ResolveError::RestrictedAccess(_)));
    }

    #[test]
    fn test_webpage_404_is_not_found() {
        let err = ResolveError::from_ytdlp_stderr(
            "ERROR: [youtube] abc123: Unable to download webpage: HTTP Error 404: Not Found",
        );
        assert!(matches!(err, ResolveError::NotFound(_)));
        assert_eq!(err.user_message(), "Video not found. Please check the URL and try again.");
    }

    #[test]
    fn test_webpage_timeout_is_network() {
        let err = ResolveError::from_ytdlp_stderr(
            "ERROR: [youtube] abc123: Unable to download webpage: <urlopen error [Errno 110] Connection timed out>",
        );
        assert!(matches!(err, ResolveError::NetworkUnreachable(_)));
    }

    #[test]
    fn test_age_gate_is_restricted() {
        let err = ResolveError::from_ytdlp_stderr("Sign in to confirm your age. This video may be inappropriate for some users.");
        assert!(matches!(err, ResolveError::RestrictedAccess(_)));
    }

    #[test]
    fn test_timeout_is_network() {
        let err = ResolveError::from_ytdlp_stderr("ERROR: Unable to download API page: <urlopen error timed out>");
        assert!(matches!(err, ResolveError::NetworkUnreachable(_)));
    }

    #[test]
    fn test_unavailable_is_not_found() {
        let err = ResolveError::from_ytdlp_stderr("ERROR: [youtube] xyz: Video unavailable");
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[test]
    fn test_extractor_breakage_is_protocol_changed() {
        let err = ResolveError::from_ytdlp_stderr(
            "ERROR: Unable to extract initial player response; please report this issue",
        );
        assert!(matches!(err, ResolveError::ProtocolChanged(_)));
    }

    #[test]
    fn test_unmatched_is_unknown() {
        let err = ResolveError::from_ytdlp_stderr("something odd happened");
        assert_eq!(err.kind(), "unknown");
        assert_eq!(err.detail(), "something odd happened");
    }

    #[test]
    fn test_user_messages_hide_detail() {
        let err = ResolveError::NotFound("secret internal path /tmp/x".to_string());
        assert!(!err.user_message().contains("/tmp/x"));
    }
}
