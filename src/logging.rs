//! Logging init: structured tracing output on stderr.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,youtube_link_server=debug,tower_http=info";

/// Initialize tracing with `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
