// bases/grab_server/src/error.rs
//! Mapping from component errors to HTTP responses.
//!
//! Search failures answer in JSON, download failures in plain text. Provider
//! details are logged where they happen and never echoed to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use media_download::DownloadError;
use serde_json::json;
use tracing::{error, warn};
use video_search::SearchError;

const SEARCH_FAILED: &str = "Failed to fetch results. Check server logs.";
const DOWNLOAD_FAILED: &str = "Server Error: Could not process download.";
const NO_FORMAT: &str = "No suitable format found.";

/// Application-level errors for HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("invalid response header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Search(SearchError::InvalidRequest(message)) => {
                warn!("Rejected search: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Search(SearchError::ProviderFailure(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": SEARCH_FAILED })),
            )
                .into_response(),
            ApiError::Download(DownloadError::InvalidRequest(message)) => {
                warn!("Rejected download: {}", message);
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::Download(DownloadError::NoFormatAvailable(media_type)) => {
                warn!("No {} format available", media_type);
                (StatusCode::NOT_FOUND, NO_FORMAT).into_response()
            }
            ApiError::Download(err) => {
                error!("Download error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, DOWNLOAD_FAILED).into_response()
            }
            ApiError::Template(err) => {
                error!("Template error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            ApiError::Header(err) => {
                error!("Header error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, DOWNLOAD_FAILED).into_response()
            }
        }
    }
}
