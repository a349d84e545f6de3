// Client controller - submit a URL, call /api/getVideo, render links
//
// The controller owns its UI handle (`View`) and HTTP access (`Transport`),
// both injected once at construction. The browser page in public/script.js
// follows the same flow.

use async_trait::async_trait;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use thiserror::Error;

use crate::models::{StreamFormat, VideoResponse};
use crate::server::GET_VIDEO_PATH;

pub const FETCH_LABEL: &str = "Fetch Video";
pub const FETCHING_LABEL: &str = "Fetching...";
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a YouTube URL.";
pub const NO_FORMATS_MESSAGE: &str = "No downloadable formats found.";
pub const FALLBACK_FAILURE_MESSAGE: &str = "Could not fetch video details.";

/// Characters stripped from titles before they become file names
const FILENAME_FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// One anchor in the download list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: String,
    /// Always "_blank": downloads open in a new context
    pub target: &'static str,
    /// Suggested file name
    pub download: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    Link(DownloadLink),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResults {
    pub title: String,
    pub thumbnail_url: String,
    pub thumbnail_alt: String,
    pub entries: Vec<ListEntry>,
}

/// UI regions the controller drives
pub trait View {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn set_fetch_button(&mut self, enabled: bool, label: &str);
    /// Hide results and error, empty the link list
    fn clear(&mut self);
    /// Show the error region and hide results
    fn show_error(&mut self, message: &str);
    /// Show results and hide the error region
    fn show_results(&mut self, results: &RenderedResults);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

/// Same-origin HTTP access to the handler
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path_and_query` relative to the server root
    async fn get(&self, path_and_query: &str) -> Result<HttpReply, TransportError>;
}

/// reqwest-backed transport rooted at a base URL
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path_and_query: &str) -> Result<HttpReply, TransportError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        tracing::debug!(url = %url, "client request");
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

/// What a submission ended up showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Displayed(RenderedResults),
    Error(String),
}

/// Restores the idle UI state when dropped, whichever path the submission took
struct LoadingGuard<'a, V: View> {
    view: &'a mut V,
}

impl<'a, V: View> LoadingGuard<'a, V> {
    fn engage(view: &'a mut V) -> Self {
        view.show_loading();
        view.set_fetch_button(false, FETCHING_LABEL);
        Self { view }
    }
}

impl<V: View> Deref for LoadingGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: View> DerefMut for LoadingGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: View> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        self.view.hide_loading();
        self.view.set_fetch_button(true, FETCH_LABEL);
    }
}

pub struct ClientController<V: View, T: Transport> {
    view: V,
    transport: T,
}

impl<V: View, T: Transport> ClientController<V, T> {
    pub fn new(view: V, transport: T) -> Self {
        Self { view, transport }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Form submission
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let video_url = input.trim();
        if video_url.is_empty() {
            self.view.show_error(EMPTY_INPUT_MESSAGE);
            return SubmitOutcome::Error(EMPTY_INPUT_MESSAGE.to_string());
        }

        self.view.clear();
        let mut view = LoadingGuard::engage(&mut self.view);

        let message = match self.transport.get(&request_path(video_url)).await {
            Err(e) => {
                tracing::error!("fetch error: {}", e);
                unexpected_error(&e.to_string())
            }
            Ok(reply) if !reply.is_ok() => message_field(&reply.body)
                .unwrap_or_else(|| format!("HTTP error! Status: {}", reply.status)),
            Ok(reply) => match serde_json::from_str::<serde_json::Value>(&reply.body) {
                Err(e) => {
                    tracing::error!("unreadable response body: {}", e);
                    unexpected_error(&e.to_string())
                }
                Ok(data) if data["success"].as_bool() == Some(true) => {
                    match serde_json::from_value::<VideoResponse>(data) {
                        Ok(video) => {
                            let results = render_results(&video);
                            view.show_results(&results);
                            return SubmitOutcome::Displayed(results);
                        }
                        Err(e) => unexpected_error(&e.to_string()),
                    }
                }
                Ok(data) => data["message"]
                    .as_str()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(FALLBACK_FAILURE_MESSAGE)
                    .to_string(),
            },
        };

        view.show_error(&message);
        SubmitOutcome::Error(message)
    }
}

fn unexpected_error(detail: &str) -> String {
    format!("An error occurred: {}. Check the console or try again.", detail)
}

/// Non-empty `message` field of a JSON error body
fn message_field(body: &str) -> Option<String> {
    let data: serde_json::Value = serde_json::from_str(body).ok()?;
    data["message"]
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Relative request path with the URL percent-encoded
pub fn request_path(video_url: &str) -> String {
    format!("{}?url={}", GET_VIDEO_PATH, urlencoding::encode(video_url))
}

pub fn render_results(video: &VideoResponse) -> RenderedResults {
    let entries = if video.formats.is_empty() {
        vec![ListEntry::Placeholder(NO_FORMATS_MESSAGE.to_string())]
    } else {
        video
            .formats
            .iter()
            .map(|format| {
                ListEntry::Link(DownloadLink {
                    href: format.url.clone(),
                    target: "_blank",
                    download: download_filename(&video.title, format),
                    text: link_text(format),
                })
            })
            .collect()
    };

    RenderedResults {
        title: video.title.clone(),
        thumbnail_url: video.thumbnail_url.clone(),
        thumbnail_alt: format!("Thumbnail for {}", video.title),
        entries,
    }
}

pub fn sanitize_title(title: &str) -> String {
    title.chars().filter(|c| !FILENAME_FORBIDDEN.contains(c)).collect()
}

/// "{title} - {quality}.{type}"
pub fn download_filename(title: &str, format: &StreamFormat) -> String {
    format!(
        "{} - {}.{}",
        sanitize_title(title),
        format.quality,
        format.format_type.to_lowercase()
    )
}

/// "{quality} ({TYPE})", flagged when the stream has no picture
pub fn link_text(format: &StreamFormat) -> String {
    let mut text = format!("{} ({})", format.quality, format.format_type);
    if format.is_audio_only() {
        text.push_str(" [Audio Only]");
    }
    text
}

/// Plain-text view for the `fetch` subcommand
#[derive(Debug, Default)]
pub struct TerminalView;

impl View for TerminalView {
    fn show_loading(&mut self) {
        eprintln!("{}", FETCHING_LABEL);
    }

    fn hide_loading(&mut self) {}

    fn set_fetch_button(&mut self, _enabled: bool, _label: &str) {}

    fn clear(&mut self) {}

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn show_results(&mut self, results: &RenderedResults) {
        println!("{}", results.title);
        if !results.thumbnail_url.is_empty() {
            println!("Thumbnail: {}", results.thumbnail_url);
        }
        println!();
        for entry in &results.entries {
            match entry {
                ListEntry::Link(link) => {
                    println!("  {}", link.text);
                    println!("    file: {}", link.download);
                    println!("    url:  {}", link.href);
                }
                ListEntry::Placeholder(text) => println!("  {}", text),
            }
        }
    }
}
