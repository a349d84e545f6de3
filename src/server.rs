//! HTTP surface: `/api/getVideo`, `/health`, and the static browser page.
//!
//! The handler is stateless apart from the shared resolver handle. Every
//! failure is turned into `{"success": false, "message": ...}` here; nothing
//! escapes as an unhandled fault.

use axum::{
    extract::{RawQuery, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::format_selector::FormatSelector;
use crate::models::{ErrorResponse, VideoResponse};
use crate::resolver::VideoResolver;

pub const GET_VIDEO_PATH: &str = "/api/getVideo";

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn VideoResolver>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn VideoResolver>) -> Self {
        Self { resolver }
    }
}

/// Handler failure, rendered as a JSON error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: "Method Not Allowed".to_string(),
        }
    }

    pub fn missing_url() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "URL parameter is required.".to_string(),
        }
    }

    pub fn invalid_url() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid YouTube URL.".to_string(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// API routes with CORS headers on every response.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            GET_VIDEO_PATH,
            get(get_video_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// API routes plus the browser page served from `static_dir`.
pub fn app_router(state: AppState, static_dir: &Path) -> Router {
    api_router(state).fallback_service(ServeDir::new(static_dir))
}

/// Start the public web server and run until Ctrl-C.
pub async fn start_web_server(
    config: &ServerConfig,
    resolver: Arc<dyn VideoResolver>,
) -> anyhow::Result<()> {
    let (host, port) = config.bind_target();
    let resolver_name = resolver.name();
    let app = app_router(AppState::new(resolver), &config.static_dir);

    tracing::info!("Starting web server on http://{}:{}", host, port);
    tracing::info!("  /               - Browser page ({})", config.static_dir.display());
    tracing::info!("  {}   - Video lookup via {}", GET_VIDEO_PATH, resolver_name);
    tracing::info!("  /health         - Health check");

    let listener = TcpListener::bind((host, port)).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// GET /api/getVideo?url=...
async fn get_video_handler(
    method: Method,
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    // HEAD is routed here by axum alongside GET
    if method != Method::GET {
        return ApiError::method_not_allowed().into_response();
    }

    match resolve_video(state.resolver.as_ref(), query.as_deref()).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response(),
    }
}

/// validate -> resolve -> shape
pub async fn resolve_video(
    resolver: &dyn VideoResolver,
    query: Option<&str>,
) -> Result<VideoResponse, ApiError> {
    let url = url_param(query).ok_or_else(ApiError::missing_url)?;

    if !resolver.validate_url(&url) {
        tracing::debug!(url = %url, "rejected invalid URL");
        return Err(ApiError::invalid_url());
    }

    let raw = match resolver.fetch_info(&url).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(
                resolver = resolver.name(),
                kind = err.kind(),
                url = %url,
                "resolver failed: {}",
                err.detail()
            );
            return Err(ApiError::upstream(err.user_message()));
        }
    };

    let info = FormatSelector::build_video_info(resolver, &raw);
    tracing::info!(
        url = %url,
        title = %info.title,
        formats = info.formats.len(),
        "resolved video"
    );

    Ok(VideoResponse::from(info))
}

/// First non-empty `url` value in the query string
fn url_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// OPTIONS preflight: headers only
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> ApiError {
    ApiError::method_not_allowed()
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
