// Resolver module - metadata extraction behind a swappable interface
//
// The HTTP handler only talks to `VideoResolver`. The yt-dlp adapter is the
// production implementation; tests plug in their own.

mod errors;
mod process;
mod traits;
mod youtube_url;
mod ytdlp;

pub use errors::ResolveError;
pub use traits::{FormatCategory, RawFormat, RawVideoInfo, Thumbnail, VideoResolver};
pub use youtube_url::{extract_video_id, is_valid_youtube_url};
pub use ytdlp::YtDlpResolver;
