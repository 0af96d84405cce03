// components/media_download/src/request.rs
use crate::error::DownloadError;
use std::fmt;
use video_provider::VideoUrl;

/// Container the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Mp3,
    Mp4,
}

impl MediaType {
    /// A missing type means video
    pub fn parse(raw: Option<&str>) -> Result<Self, DownloadError> {
        match raw {
            Some("mp3") => Ok(MediaType::Mp3),
            Some("mp4") | None => Ok(MediaType::Mp4),
            Some(other) => Err(DownloadError::InvalidRequest(format!(
                "Unsupported type: {}",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Mp3 => "mp3",
            MediaType::Mp4 => "mp4",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MediaType::Mp3 => "audio/mpeg",
            MediaType::Mp4 => "video/mp4",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Preferred video quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    P360,
    P720,
    P1080,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::P360, Quality::P720, Quality::P1080];

    /// Unknown or missing labels take the 360p branch
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("1080p") => Quality::P1080,
            Some("720p") => Quality::P720,
            Some("360p") => Quality::P360,
            _ => Quality::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Quality::P360 => "Fast",
            Quality::P720 => "HD",
            Quality::P1080 => "FHD",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A validated download request
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: VideoUrl,
    pub media_type: MediaType,
    pub quality: Quality,
}

impl DownloadRequest {
    /// Build from raw query parameters. Nothing is fetched when this fails.
    pub fn from_params(
        url: Option<&str>,
        media_type: Option<&str>,
        quality: Option<&str>,
    ) -> Result<Self, DownloadError> {
        let url = url
            .and_then(|raw| VideoUrl::parse(raw).ok())
            .ok_or_else(|| DownloadError::InvalidRequest("Invalid YouTube URL".to_string()))?;

        Ok(Self {
            url,
            media_type: MediaType::parse(media_type)?,
            quality: Quality::parse_lenient(quality),
        })
    }
}
