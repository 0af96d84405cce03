// components/video_search/src/types.rs
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;
use video_provider::{ProviderError, VideoUrl};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("Provider failure: {0}")]
    ProviderFailure(#[from] ProviderError),
}

/// One normalized search result, whichever lookup mode produced it.
///
/// Serializes to the shape the browser client consumes:
/// `{"type":"video","title","url","thumbnail","timestamp","author":{"name"}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "video")]
pub struct SearchResult {
    pub title: String,
    pub url: VideoUrl,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "timestamp")]
    pub duration_label: String,
    #[serde(rename = "author", serialize_with = "author_object")]
    pub author_name: String,
}

fn author_object<S: Serializer>(name: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut author = serializer.serialize_struct("Author", 1)?;
    author.serialize_field("name", name)?;
    author.end()
}
