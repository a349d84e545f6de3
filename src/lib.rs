pub mod cli;
pub mod client;
pub mod config;
pub mod format_selector;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod server;

pub use client::{ClientController, HttpTransport, SubmitOutcome, Transport, View};
pub use config::{ResolverConfig, ServerConfig};
pub use format_selector::FormatSelector;
pub use models::{ErrorResponse, StreamFormat, VideoInfo, VideoResponse};
pub use resolver::{FormatCategory, RawFormat, RawVideoInfo, ResolveError, VideoResolver, YtDlpResolver};
pub use server::{api_router, app_router, AppState};
