// components/video_provider/src/video_url.rs
use crate::types::ProviderError;
use std::fmt;
use url::Url;

const ID_LENGTH: usize = 11;

const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

/// Path prefixes that carry the video id as the next segment
const ID_PATHS: &[&str] = &["embed", "v", "shorts", "live", "e"];

/// Canonical video URL: `https://www.youtube.com/watch?v=<id>`.
///
/// Every accepted spelling of a video link collapses to the same value, and
/// the canonical form parses back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoUrl {
    id: String,
}

impl VideoUrl {
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        let invalid = || ProviderError::InvalidUrl(raw.to_string());

        let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid());
        }

        let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
        let id = if host == "youtu.be" {
            first_segment(&url).map(str::to_string)
        } else if VIDEO_HOSTS.contains(&host.as_str()) {
            id_from_query(&url).or_else(|| id_from_path(&url))
        } else {
            None
        };

        match id {
            Some(id) if is_valid_id(&id) => Ok(Self { id }),
            _ => Err(invalid()),
        }
    }

    /// Cheap predicate form of [`VideoUrl::parse`]
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for VideoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://www.youtube.com/watch?v={}", self.id)
    }
}

impl serde::Serialize for VideoUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn first_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.next().filter(|s| !s.is_empty())
}

fn id_from_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn id_from_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    let prefix = segments.next()?;
    if !ID_PATHS.contains(&prefix) {
        return None;
    }
    segments.next().map(str::to_string)
}

fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
