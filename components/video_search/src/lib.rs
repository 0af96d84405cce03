// components/video_search/src/lib.rs
mod duration;
mod types;

use std::sync::Arc;
use tracing::{debug, error, warn};
use video_provider::{ProviderError, SearchHit, VideoDetails, VideoProvider, VideoUrl};

pub use duration::clock_label;
pub use types::{SearchError, SearchResult};

/// Keyword searches return at most this many results
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Hits requested from the provider, leaving room for ones that get dropped
const PROVIDER_HIT_LIMIT: usize = SEARCH_RESULT_LIMIT * 2;

/// Turns a free-text query or a pasted video link into normalized results
pub struct VideoSearch {
    provider: Arc<dyn VideoProvider>,
}

impl VideoSearch {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self { provider }
    }

    /// A query that is itself a video URL is looked up directly; anything
    /// else goes to keyword search.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidRequest("Query is required"));
        }

        let outcome = match VideoUrl::parse(query) {
            Ok(url) => self.lookup(&url).await.map(|result| vec![result]),
            Err(_) => self.keyword_search(query).await,
        };

        outcome.map_err(|e| {
            error!("Search for {:?} failed: {}", query, e);
            SearchError::ProviderFailure(e)
        })
    }

    async fn lookup(&self, url: &VideoUrl) -> Result<SearchResult, ProviderError> {
        debug!("Direct lookup of {}", url);
        let details = self.provider.basic_info(url).await?;
        Ok(from_details(details))
    }

    async fn keyword_search(
        &self,
        query: &str,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        debug!("Keyword search for {:?}", query);
        let hits = self.provider.search(query, PROVIDER_HIT_LIMIT).await?;

        Ok(hits
            .into_iter()
            .filter_map(from_hit)
            .take(SEARCH_RESULT_LIMIT)
            .collect())
    }
}

fn from_details(details: VideoDetails) -> SearchResult {
    // max_by_key keeps the last of equal keys, so unsized lists fall back
    // to the final (largest) entry
    let thumbnail_url = details
        .thumbnails
        .into_iter()
        .max_by_key(|t| t.area())
        .map(|t| t.url)
        .unwrap_or_default();

    SearchResult {
        title: details.title,
        url: details.url,
        thumbnail_url,
        duration_label: clock_label(details.length_seconds),
        author_name: details.author_name,
    }
}

fn from_hit(hit: SearchHit) -> Option<SearchResult> {
    let url = match VideoUrl::parse(&hit.url) {
        Ok(url) => url,
        Err(_) => {
            warn!("Dropping search hit with unsupported URL: {}", hit.url);
            return None;
        }
    };

    Some(SearchResult {
        title: hit.title,
        url,
        thumbnail_url: hit.thumbnail_url,
        duration_label: hit.duration_label,
        author_name: hit.author_name,
    })
}
