// components/video_provider/src/ytdlp.rs
use crate::types::{
    FormatDescriptor, MediaStream, ProviderError, SearchHit, Thumbnail, VideoDetails, VideoInfo,
    VideoProvider,
};
use crate::video_url::VideoUrl;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, ChildStdout, Command};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// Provider backed by the `yt-dlp` command line tool
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    lookup_timeout: Option<Duration>,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            lookup_timeout: None,
        }
    }

    /// Bound search and metadata calls. Streams are never bounded.
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, ProviderError> {
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let command = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, command)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => command.await,
        }
        .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ProviderError::LookupFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    fn spawn_error(&self, err: std::io::Error) -> ProviderError {
        if err.kind() == ErrorKind::NotFound {
            ProviderError::DependencyNotFound("yt-dlp")
        } else {
            ProviderError::IoError(err)
        }
    }

    async fn fetch_video(&self, url: &VideoUrl) -> Result<YtDlpVideo, ProviderError> {
        let url = url.to_string();
        self.run_json(&["-J", "--no-playlist", "--no-warnings", "--", &url])
            .await
    }
}

#[async_trait]
impl VideoProvider for YtDlp {
    async fn check_available(&self) -> Result<(), ProviderError> {
        which::which(&self.binary)
            .map(|_| ())
            .map_err(|_| ProviderError::DependencyNotFound("yt-dlp"))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let term = format!("ytsearch{}:{}", limit, query);
        let playlist: YtDlpPlaylist = self
            .run_json(&["--flat-playlist", "-J", "--no-warnings", &term])
            .await?;

        Ok(playlist
            .entries
            .into_iter()
            .filter_map(YtDlpEntry::into_hit)
            .take(limit)
            .collect())
    }

    async fn basic_info(&self, url: &VideoUrl) -> Result<VideoDetails, ProviderError> {
        let video = self.fetch_video(url).await?;
        Ok(video.into_details(url))
    }

    async fn full_info(&self, url: &VideoUrl) -> Result<VideoInfo, ProviderError> {
        let mut video = self.fetch_video(url).await?;
        let formats = std::mem::take(&mut video.formats)
            .into_iter()
            .map(YtDlpFormat::into_descriptor)
            .collect();

        Ok(VideoInfo {
            details: video.into_details(url),
            formats,
        })
    }

    async fn open_stream(
        &self,
        url: &VideoUrl,
        format: &FormatDescriptor,
    ) -> Result<MediaStream, ProviderError> {
        let url = url.to_string();
        let mut child = Command::new(&self.binary)
            .args(["-f", format.format_id.as_str()])
            .args(["-o", "-", "--no-playlist", "--quiet", "--no-warnings", "--"])
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ProviderError::IoError(std::io::Error::other("yt-dlp stdout was not captured"))
        })?;

        debug!("Streaming format {} of {}", format.format_id, url);
        Ok(MediaStream::new(child_output(child, stdout)))
    }
}

/// Stdout of a running child as a byte stream. The child is owned by the
/// stream, so dropping the stream kills the process.
fn child_output(child: Child, stdout: ChildStdout) -> impl Stream<Item = std::io::Result<Bytes>> {
    async_stream::try_stream! {
        let mut child = child;
        let mut chunks = ReaderStream::new(stdout);

        while let Some(chunk) = chunks.next().await {
            yield chunk?;
        }

        let status = child.wait().await?;
        if !status.success() {
            error!("yt-dlp exited with status: {}", status);
            Err::<(), _>(std::io::Error::other(format!(
                "yt-dlp exited with status: {}",
                status
            )))?;
        }
    }
}

/// yt-search style label: `M:SS`, or `H:MM:SS` past the hour
pub fn timestamp_label(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return String::new();
    };
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    entries: Vec<YtDlpEntry>,
}

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
    channel: Option<String>,
    uploader: Option<String>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
}

impl YtDlpEntry {
    fn into_hit(self) -> Option<SearchHit> {
        let url = self
            .webpage_url
            .or(self.url)
            .or_else(|| {
                self.id
                    .as_ref()
                    .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            })?;

        let thumbnail_url = self
            .thumbnail
            .or_else(|| self.thumbnails.into_iter().last().map(|t| t.url))
            .unwrap_or_default();

        Some(SearchHit {
            title: self.title.unwrap_or_default(),
            url,
            thumbnail_url,
            duration_label: timestamp_label(self.duration),
            author_name: self.channel.or(self.uploader).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct YtDlpVideo {
    title: String,
    duration: Option<f64>,
    channel: Option<String>,
    uploader: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

impl YtDlpVideo {
    fn into_details(self, url: &VideoUrl) -> VideoDetails {
        VideoDetails {
            title: self.title,
            url: url.clone(),
            thumbnails: self
                .thumbnails
                .into_iter()
                .map(|t| Thumbnail {
                    url: t.url,
                    width: t.width,
                    height: t.height,
                })
                .collect(),
            length_seconds: self
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d.round() as u64)
                .unwrap_or(0),
            author_name: self.channel.or(self.uploader).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    height: Option<u32>,
    fps: Option<f64>,
    abr: Option<f64>,
}

impl YtDlpFormat {
    fn into_descriptor(self) -> FormatDescriptor {
        let present = |codec: &Option<String>| codec.as_deref().is_some_and(|c| c != "none");
        let has_video = present(&self.vcodec);
        let has_audio = present(&self.acodec);

        let quality_label = match (has_video, self.height) {
            (true, Some(height)) => match self.fps {
                Some(fps) if fps > 30.0 => format!("{}p{}", height, fps.round() as u32),
                _ => format!("{}p", height),
            },
            _ => String::new(),
        };

        FormatDescriptor {
            format_id: self.format_id,
            quality_label,
            has_video,
            has_audio,
            audio_bitrate: self.abr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::time::Instant;
    use tempfile::TempDir;

    const URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    /// Executable shell script standing in for yt-dlp; it ignores its arguments
    #[cfg(unix)]
    fn fake_ytdlp(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Alive and not yet a zombie
    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        std::fs::read_to_string(format!("/proc/{}/stat", pid))
            .ok()
            .and_then(|stat| {
                stat.rsplit_once(')')
                    .map(|(_, rest)| !rest.trim_start().starts_with('Z'))
            })
            .unwrap_or(false)
    }

    #[rstest]
    #[case(None, "")]
    #[case(Some(0.0), "0:00")]
    #[case(Some(7.4), "0:07")]
    #[case(Some(187.0), "3:07")]
    #[case(Some(3600.0), "1:00:00")]
    #[case(Some(36_061.0), "10:01:01")]
    #[case(Some(-3.0), "")]
    fn timestamp_labels(#[case] seconds: Option<f64>, #[case] expected: &str) {
        assert_eq!(timestamp_label(seconds), expected);
    }

    #[test]
    fn flat_search_entries_become_hits() {
        let json = r#"{
            "entries": [
                {
                    "id": "dQw4w9WgXcQ",
                    "title": "Never Gonna Give You Up",
                    "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                    "duration": 212.0,
                    "channel": "Rick Astley",
                    "thumbnails": [
                        {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", "width": 168, "height": 94},
                        {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq720.jpg", "width": 336, "height": 188}
                    ]
                },
                {
                    "id": "abcdefghijk",
                    "title": "No url field",
                    "uploader": "Someone"
                }
            ]
        }"#;

        let playlist: YtDlpPlaylist = serde_json::from_str(json).unwrap();
        let hits: Vec<_> = playlist.entries.into_iter().filter_map(YtDlpEntry::into_hit).collect();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Never Gonna Give You Up");
        assert_eq!(hits[0].duration_label, "3:32");
        assert_eq!(hits[0].author_name, "Rick Astley");
        assert_eq!(hits[0].thumbnail_url, "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq720.jpg");
        assert_eq!(hits[1].url, "https://www.youtube.com/watch?v=abcdefghijk");
        assert_eq!(hits[1].author_name, "Someone");
        assert_eq!(hits[1].duration_label, "");
    }

    #[test]
    fn formats_map_track_presence_and_labels() {
        let json = r#"{
            "title": "Clip",
            "duration": 61.6,
            "uploader": "Uploader",
            "thumbnails": [{"url": "https://i.ytimg.com/a.jpg"}],
            "formats": [
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5},
                {"format_id": "18", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "height": 360, "fps": 30},
                {"format_id": "299", "vcodec": "avc1.64002a", "acodec": "none", "height": 1080, "fps": 60},
                {"format_id": "sb0", "vcodec": "none", "acodec": "none", "height": 90}
            ]
        }"#;

        let video: YtDlpVideo = serde_json::from_str(json).unwrap();
        let url = VideoUrl::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let formats: Vec<_> = video
            .formats
            .into_iter()
            .map(YtDlpFormat::into_descriptor)
            .collect();

        assert!(formats[0].is_audio_only());
        assert_eq!(formats[0].audio_bitrate, Some(129.5));
        assert_eq!(formats[0].quality_label, "");
        assert!(formats[1].is_combined());
        assert_eq!(formats[1].quality_label, "360p");
        assert!(!formats[2].has_audio);
        assert_eq!(formats[2].quality_label, "1080p60");
        assert!(!formats[3].has_audio && !formats[3].has_video);

        let video: YtDlpVideo = serde_json::from_str(json).unwrap();
        let details = video.into_details(&url);
        assert_eq!(details.length_seconds, 62);
        assert_eq!(details.author_name, "Uploader");
        assert_eq!(details.url, url);
        assert_eq!(details.thumbnails[0].width, None);
    }

    #[tokio::test]
    async fn missing_binary_is_reported_as_dependency() {
        let provider = YtDlp::new("/nonexistent/yt-dlp-binary");
        assert!(matches!(
            provider.check_available().await,
            Err(ProviderError::DependencyNotFound("yt-dlp"))
        ));

        let url = VideoUrl::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert!(matches!(
            provider.basic_info(&url).await,
            Err(ProviderError::DependencyNotFound("yt-dlp"))
        ));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn dropping_the_stream_kills_yt_dlp() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("pid");
        let script = fake_ytdlp(
            &dir,
            &format!("echo $$ > '{}'\nexec yes media-bytes", pid_file.display()),
        );
        let provider = YtDlp::new(script);
        let url = VideoUrl::parse(URL).unwrap();
        let format = FormatDescriptor {
            format_id: "18".to_string(),
            quality_label: "360p".to_string(),
            has_video: true,
            has_audio: true,
            audio_bitrate: None,
        };

        let mut stream = provider.open_stream(&url, &format).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert!(!first.is_empty());

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(is_running(pid));

        drop(stream);

        let mut waited = Duration::ZERO;
        while is_running(pid) && waited < Duration::from_secs(2) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }
        assert!(!is_running(pid), "yt-dlp ({}) outlived its stream", pid);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_lookups_time_out() {
        let dir = TempDir::new().unwrap();
        let limit = Duration::from_millis(300);
        let provider = YtDlp::new(fake_ytdlp(&dir, "exec sleep 30")).with_lookup_timeout(Some(limit));
        let url = VideoUrl::parse(URL).unwrap();

        let started = Instant::now();
        assert_matches!(
            provider.basic_info(&url).await,
            Err(ProviderError::Timeout(after)) if after == limit
        );
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_matches!(
            provider.search("lofi", 5).await,
            Err(ProviderError::Timeout(_))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn lookups_are_unbounded_without_a_timeout() {
        let dir = TempDir::new().unwrap();
        let script = fake_ytdlp(&dir, r#"sleep 1; echo '{"entries": []}'"#);
        let provider = YtDlp::new(script);

        let hits = provider.search("lofi", 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
