// components/video_provider/src/stub.rs
//! In-memory provider for tests.
use crate::types::{
    FormatDescriptor, MediaStream, ProviderError, SearchHit, VideoDetails, VideoInfo,
    VideoProvider,
};
use crate::video_url::VideoUrl;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers every call from the fields below and records what was asked.
#[derive(Debug, Default)]
pub struct ProviderStub {
    pub hits: Vec<SearchHit>,
    pub info: Option<VideoInfo>,
    /// Chunks emitted by every opened stream
    pub payload: Vec<Bytes>,
    /// Emit an error after the payload
    pub break_stream: bool,
    /// Fail every lookup with this message
    pub failure: Option<String>,
    search_calls: AtomicUsize,
    info_calls: AtomicUsize,
    opened: Mutex<Vec<String>>,
}

impl ProviderStub {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn with_info(info: VideoInfo) -> Self {
        Self {
            info: Some(info),
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Format ids of every stream opened so far
    pub fn opened_formats(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(message) => Err(ProviderError::LookupFailed(message.clone())),
            None => Ok(()),
        }
    }

    fn lookup(&self) -> Result<VideoInfo, ProviderError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.info
            .clone()
            .ok_or_else(|| ProviderError::LookupFailed("Video unavailable".to_string()))
    }
}

#[async_trait]
impl VideoProvider for ProviderStub {
    async fn check_available(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    async fn basic_info(&self, _url: &VideoUrl) -> Result<VideoDetails, ProviderError> {
        self.lookup().map(|info| info.details)
    }

    async fn full_info(&self, _url: &VideoUrl) -> Result<VideoInfo, ProviderError> {
        self.lookup()
    }

    async fn open_stream(
        &self,
        _url: &VideoUrl,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, ProviderError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(format.format_id.clone());
        }

        let mut chunks: Vec<std::io::Result<Bytes>> =
            self.payload.iter().cloned().map(Ok).collect();
        if self.break_stream {
            chunks.push(Err(std::io::Error::other("connection reset by provider")));
        }
        Ok(MediaStream::new(futures::stream::iter(chunks)))
    }
}
