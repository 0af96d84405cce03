// components/media_download/src/lib.rs
mod error;
mod filename;
mod request;
mod selection;

use std::sync::Arc;
use tracing::{error, info};
use video_provider::{FormatDescriptor, MediaStream, VideoProvider};

pub use error::DownloadError;
pub use filename::{download_filename, sanitize_title};
pub use request::{DownloadRequest, MediaType, Quality};
pub use selection::select_format;

/// Everything needed to answer a download before the first byte is sent
#[derive(Debug)]
pub struct PreparedDownload {
    pub title: String,
    pub filename: String,
    pub content_type: &'static str,
    pub format: FormatDescriptor,
    pub stream: MediaStream,
}

impl PreparedDownload {
    /// `attachment; filename="<name>"`
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

pub struct MediaDownloader {
    provider: Arc<dyn VideoProvider>,
}

impl MediaDownloader {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self { provider }
    }

    /// Look up the video's formats, pick one, and open its byte stream
    pub async fn prepare(&self, request: &DownloadRequest) -> Result<PreparedDownload, DownloadError> {
        let info = self.provider.full_info(&request.url).await.map_err(|e| {
            error!("Format lookup for {} failed: {}", request.url, e);
            DownloadError::ProviderFailure(e)
        })?;

        let format = select_format(&info.formats, request.media_type, request.quality)
            .cloned()
            .ok_or(DownloadError::NoFormatAvailable(request.media_type))?;

        let filename = download_filename(&info.details.title, request.media_type);
        info!(
            "Serving {} as {} (format {}, {} {})",
            request.url,
            filename,
            format.format_id,
            format.kind(),
            format.quality_label
        );

        let stream = self
            .provider
            .open_stream(&request.url, &format)
            .await
            .map_err(|e| {
                error!("Opening stream for {} failed: {}", request.url, e);
                DownloadError::ProviderFailure(e)
            })?;

        Ok(PreparedDownload {
            title: info.details.title,
            filename,
            content_type: request.media_type.content_type(),
            format,
            stream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use bytes::Bytes;
    use futures::StreamExt;
    use video_provider::stub::ProviderStub;
    use video_provider::{VideoDetails, VideoInfo, VideoUrl};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn format(id: &str, label: &str, has_video: bool, has_audio: bool) -> FormatDescriptor {
        FormatDescriptor {
            format_id: id.to_string(),
            quality_label: label.to_string(),
            has_video,
            has_audio,
            audio_bitrate: has_audio.then_some(128.0),
        }
    }

    fn info(formats: Vec<FormatDescriptor>) -> VideoInfo {
        VideoInfo {
            details: VideoDetails {
                title: "Foo? Bar: Baz!".to_string(),
                url: VideoUrl::parse(URL).unwrap(),
                thumbnails: vec![],
                length_seconds: 212,
                author_name: "Channel".to_string(),
            },
            formats,
        }
    }

    fn downloader(stub: ProviderStub) -> (Arc<ProviderStub>, MediaDownloader) {
        let stub = Arc::new(stub);
        (stub.clone(), MediaDownloader::new(stub))
    }

    fn request(media: &str, quality: &str) -> DownloadRequest {
        DownloadRequest::from_params(Some(URL), Some(media), Some(quality)).unwrap()
    }

    #[tokio::test]
    async fn mp3_is_audio_mpeg_whatever_quality_was_asked() {
        let mut stub = ProviderStub::with_info(info(vec![
            format("18", "360p", true, true),
            format("140", "", false, true),
        ]));
        stub.payload = vec![Bytes::from_static(b"ID3"), Bytes::from_static(b"data")];
        let (stub, downloader) = downloader(stub);

        for quality in ["360p", "720p", "1080p", "highest"] {
            let prepared = downloader.prepare(&request("mp3", quality)).await.unwrap();
            assert_eq!(prepared.content_type, "audio/mpeg");
            assert_eq!(prepared.filename, "Foo Bar Baz.mp3");
            assert_eq!(prepared.format.format_id, "140");
        }
        assert_eq!(stub.opened_formats(), vec!["140"; 4]);
    }

    #[tokio::test]
    async fn mp4_streams_selected_format_bytes() {
        let mut stub = ProviderStub::with_info(info(vec![
            format("18", "360p", true, true),
            format("22", "720p", true, true),
        ]));
        stub.payload = vec![Bytes::from_static(b"ftyp"), Bytes::from_static(b"moov")];
        let (stub, downloader) = downloader(stub);

        let prepared = downloader.prepare(&request("mp4", "1080p")).await.unwrap();

        assert_eq!(prepared.format.format_id, "18");
        assert_eq!(prepared.content_type, "video/mp4");
        assert_eq!(
            prepared.content_disposition(),
            "attachment; filename=\"Foo Bar Baz.mp4\""
        );
        let body: Vec<Bytes> = prepared.stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(body.concat(), b"ftypmoov");
        assert_eq!(stub.opened_formats(), vec!["18"]);
    }

    #[tokio::test]
    async fn no_combined_format_is_reported_not_substituted() {
        let stub = ProviderStub::with_info(info(vec![
            format("137", "1080p", true, false),
            format("140", "", false, true),
        ]));
        let (stub, downloader) = downloader(stub);

        assert_matches!(
            downloader.prepare(&request("mp4", "1080p")).await,
            Err(DownloadError::NoFormatAvailable(MediaType::Mp4))
        );
        assert!(stub.opened_formats().is_empty());
    }

    #[tokio::test]
    async fn missing_audio_only_format_fails_mp3() {
        let (_, downloader) = downloader(ProviderStub::with_info(info(vec![format(
            "18", "360p", true, true,
        )])));

        assert_matches!(
            downloader.prepare(&request("mp3", "360p")).await,
            Err(DownloadError::NoFormatAvailable(MediaType::Mp3))
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_provider_failure() {
        let (_, downloader) = downloader(ProviderStub::failing("Sign in to confirm your age"));

        assert_matches!(
            downloader.prepare(&request("mp4", "360p")).await,
            Err(DownloadError::ProviderFailure(_))
        );
    }
}
