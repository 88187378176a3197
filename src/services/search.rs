use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::models::SearchResponse;
use crate::services::ListingSource;

pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching and decoding search results
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

/// Decode a raw response body into the ordered listing
///
/// The top-level `result` array is required; record fields are optional.
pub fn decode_listing(body: &[u8]) -> Result<SearchResponse, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

/// Client for the product search endpoint
///
/// Issues a single GET per call against a fixed, pre-resolved URL. No
/// retries happen here.
pub struct SearchClient {
    url: String,
    client: Client,
}

impl SearchClient {
    /// Create a new search client
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the current listing
    pub async fn search(&self) -> Result<SearchResponse, FetchError> {
        tracing::info!("Searching...");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            tracing::error!("Search request failed: {}", e);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Search endpoint returned {}, decoding body anyway", status);
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read search response body: {}", e);
            e
        })?;

        let listing = decode_listing(&body).map_err(|e| {
            tracing::error!("Error decoding search response: {}", e);
            e
        })?;

        tracing::debug!("Decoded {} listings", listing.len());

        Ok(listing)
    }
}

#[async_trait]
impl ListingSource for SearchClient {
    async fn fetch(&self) -> Result<SearchResponse, FetchError> {
        self.search().await
    }
}
