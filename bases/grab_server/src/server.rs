// bases/grab_server/src/server.rs
use crate::body::download_body;
use crate::config::Config;
use crate::error::ApiError;
use askama::Template;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use media_download::{DownloadError, DownloadRequest, MediaDownloader, Quality};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, info};
use video_provider::VideoProvider;
use video_search::{SearchError, SearchResult, VideoSearch};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    search: Arc<VideoSearch>,
    downloader: Arc<MediaDownloader>,
}

impl AppState {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self {
            search: Arc::new(VideoSearch::new(provider.clone())),
            downloader: Arc::new(MediaDownloader::new(provider)),
        }
    }
}

/// Main page; the card markup is cloned from a `<template>` by the client
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    qualities: Vec<Quality>,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    url: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    quality: Option<String>,
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/search", get(search))
        .route("/api/download", get(download))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until it fails
pub async fn run(provider: Arc<dyn VideoProvider>, config: Config) -> color_eyre::Result<()> {
    let app = router(AppState::new(provider), &config.static_dir);

    let listener = tokio::net::TcpListener::bind((config.bind, config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    info!("Serving static files from {}", config.static_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Result<Html<String>, ApiError> {
    let template = IndexTemplate {
        qualities: Quality::ALL.to_vec(),
        version: env!("CARGO_PKG_VERSION"),
    };

    Ok(Html(template.render()?))
}

async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        debug!("Rejected search query string: {}", rejection);
        SearchError::InvalidRequest("Invalid query string")
    })?;
    let query = params.q.unwrap_or_default();
    let results = state.search.search(&query).await?;

    info!("Search {:?} returned {} result(s)", query.trim(), results.len());
    Ok(Json(SearchResponse {
        success: true,
        results,
    }))
}

async fn download(
    State(state): State<AppState>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        debug!("Rejected download query string: {}", rejection);
        DownloadError::InvalidRequest("Invalid query string".to_string())
    })?;
    let request = DownloadRequest::from_params(
        params.url.as_deref(),
        params.media_type.as_deref(),
        params.quality.as_deref(),
    )?;

    let prepared = state.downloader.prepare(&request).await?;
    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(prepared.content_type)),
        (
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&prepared.content_disposition())?,
        ),
    ];

    Ok((headers, download_body(prepared)).into_response())
}
