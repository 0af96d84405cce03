// components/video_provider/src/types.rs
use crate::video_url::VideoUrl;
use bytes::Bytes;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("Could not parse provider output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One candidate returned by a keyword search, in provider terms
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    /// Whatever URL the provider reports; not yet validated
    pub url: String,
    pub thumbnail_url: String,
    /// Provider-formatted duration, e.g. `3:07`
    pub duration_label: String,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Thumbnail {
    /// Pixel area, zero when the provider did not report dimensions
    pub fn area(&self) -> u64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) => u64::from(w) * u64::from(h),
            _ => 0,
        }
    }
}

/// Basic metadata about a single video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    pub title: String,
    pub url: VideoUrl,
    /// Provider order, usually ascending resolution
    pub thumbnails: Vec<Thumbnail>,
    pub length_seconds: u64,
    pub author_name: String,
}

/// Full metadata including every encoded variant the provider offers
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub details: VideoDetails,
    pub formats: Vec<FormatDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// An encoded variant of a video
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    /// Provider handle used to request the bytes of this variant
    pub format_id: String,
    /// e.g. `720p`, `1080p60`; empty for audio-only variants
    pub quality_label: String,
    pub has_video: bool,
    pub has_audio: bool,
    /// Average audio bitrate in kbit/s, when known
    pub audio_bitrate: Option<f64>,
}

impl FormatDescriptor {
    pub fn kind(&self) -> MediaKind {
        if self.has_video {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    /// Carries both tracks multiplexed together
    pub fn is_combined(&self) -> bool {
        self.has_video && self.has_audio
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Encoded media bytes flowing from the provider.
///
/// Dropping the stream terminates the upstream transfer.
pub struct MediaStream {
    inner: ByteStream,
}

impl MediaStream {
    pub fn new(stream: impl Stream<Item = std::io::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for MediaStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
pub trait VideoProvider: Send + Sync {
    /// Check if the provider is available and has all required dependencies
    async fn check_available(&self) -> Result<(), ProviderError>;

    /// Keyword search, at most `limit` hits in provider order
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;

    /// Cheap single-video lookup without the format list
    async fn basic_info(&self, url: &VideoUrl) -> Result<VideoDetails, ProviderError>;

    /// Full lookup including every available format
    async fn full_info(&self, url: &VideoUrl) -> Result<VideoInfo, ProviderError>;

    /// Open the byte stream of one format
    async fn open_stream(
        &self,
        url: &VideoUrl,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, ProviderError>;
}
