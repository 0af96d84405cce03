// components/media_download/src/error.rs
use crate::request::MediaType;
use thiserror::Error;
use video_provider::ProviderError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider failure: {0}")]
    ProviderFailure(#[from] ProviderError),

    #[error("No {0} format available")]
    NoFormatAvailable(MediaType),

    /// The transfer broke after response headers were committed
    #[error("Stream of {filename} failed: {source}")]
    StreamFailure {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn stream_failure(filename: impl Into<String>, source: std::io::Error) -> Self {
        DownloadError::StreamFailure {
            filename: filename.into(),
            source,
        }
    }
}
