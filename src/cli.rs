use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientController, HttpTransport, SubmitOutcome, TerminalView};
use crate::config::{ResolverConfig, ServerConfig};
use crate::resolver::YtDlpResolver;
use crate::server;

/// Top-level CLI for the YouTube link server.
#[derive(Debug, Parser)]
#[command(name = "youtube-link-server")]
#[command(about = "Resolve YouTube URLs into direct download links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the API and the browser page (default).
    Serve {
        /// Bind address [env: HOST]
        #[arg(long)]
        host: Option<String>,

        /// Listen port [env: PORT]
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding index.html and script.js [env: STATIC_DIR]
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// yt-dlp binary [env: YTDLP_PATH]
        #[arg(long)]
        ytdlp_path: Option<String>,

        /// Resolver timeout in seconds [env: YTDLP_TIMEOUT]
        #[arg(long)]
        timeout: Option<u32>,

        /// Proxy passed to yt-dlp [env: YTDLP_PROXY]
        #[arg(long)]
        proxy: Option<String>,

        /// cookies.txt passed to yt-dlp [env: YTDLP_COOKIES]
        #[arg(long)]
        cookies: Option<String>,
    },

    /// Ask a running server for the download links of one video.
    Fetch {
        /// YouTube video URL.
        url: String,

        /// Server base URL.
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Request timeout in seconds.
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let command = cli.command.unwrap_or(CliCommand::Serve {
            host: None,
            port: None,
            static_dir: None,
            ytdlp_path: None,
            timeout: None,
            proxy: None,
            cookies: None,
        });
        command.run().await
    }

    pub async fn run(self) -> Result<()> {
        match self {
            CliCommand::Serve {
                host,
                port,
                static_dir,
                ytdlp_path,
                timeout,
                proxy,
                cookies,
            } => {
                let resolver_config = ResolverConfig::from_env()
                    .with_ytdlp_path(ytdlp_path)
                    .with_timeout(timeout)
                    .with_proxy(proxy)
                    .with_cookies_path(cookies);
                let config = ServerConfig::from_env()
                    .with_host(host)
                    .with_port(port)
                    .with_static_dir(static_dir)
                    .with_resolver(resolver_config);
                tracing::debug!("loaded config: {:?}", config);

                let resolver = YtDlpResolver::new(config.resolver.clone());
                if !resolver.is_available() {
                    tracing::warn!(
                        "yt-dlp not runnable at {}; lookups will fail until it is installed",
                        resolver.ytdlp_path()
                    );
                }

                server::start_web_server(&config, Arc::new(resolver)).await
            }
            CliCommand::Fetch {
                url,
                server,
                timeout,
            } => {
                let transport = HttpTransport::new(&server, Duration::from_secs(timeout))?;
                let mut controller = ClientController::new(TerminalView, transport);

                match controller.submit(&url).await {
                    SubmitOutcome::Displayed(_) => Ok(()),
                    SubmitOutcome::Error(message) => bail!(message),
                }
            }
        }
    }
}
