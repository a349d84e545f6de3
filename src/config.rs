// Runtime configuration
//
// Defaults come from the environment; CLI flags override them through the
// builder methods.

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// Settings for the yt-dlp resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Explicit yt-dlp binary; discovered on PATH when `None`
    pub ytdlp_path: Option<String>,
    /// Socket and process timeout in seconds
    pub timeout_seconds: u32,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            proxy: None,
            cookies_path: None,
        }
    }
}

impl ResolverConfig {
    /// Read `YTDLP_PATH`, `YTDLP_TIMEOUT`, `YTDLP_PROXY`, `YTDLP_COOKIES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ytdlp_path: env_non_empty("YTDLP_PATH"),
            timeout_seconds: env_non_empty("YTDLP_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            proxy: env_non_empty("YTDLP_PROXY"),
            cookies_path: env_non_empty("YTDLP_COOKIES"),
        }
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        if path.is_some() {
            self.ytdlp_path = path;
        }
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u32>) -> Self {
        if let Some(seconds) = seconds {
            self.timeout_seconds = seconds;
        }
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        if proxy.is_some() {
            self.proxy = proxy;
        }
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        if path.is_some() {
            self.cookies_path = path;
        }
        self
    }
}

/// Settings for the HTTP listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding index.html and script.js
    pub static_dir: PathBuf,
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            resolver: ResolverConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `STATIC_DIR` plus the resolver variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_non_empty("HOST").unwrap_or(defaults.host),
            port: env_non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            static_dir: env_non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            resolver: ResolverConfig::from_env(),
        }
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.static_dir = dir;
        }
        self
    }

    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Host and port for the listener; host names are resolved at bind time
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
