//! iTunes Search artwork lookup
//!
//! No credentials needed; used as a fallback when Spotify is not
//! configured or finds nothing.

use super::ArtworkProvider;
use crate::error::{Error, Result};
use crate::http::{trim_base, HttpSettings};
use async_trait::async_trait;
use pltplaylist::SongInfo;
use reqwest::Client;
use serde::Deserialize;

/// Default iTunes Search API base URL
pub const DEFAULT_ITUNES_BASE: &str = "https://itunes.apple.com";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    #[serde(default)]
    artwork_url100: Option<String>,
}

/// Search term for a song: artist and title, artist omitted when unknown
pub fn search_term(song: &SongInfo) -> String {
    if song.has_known_artist() {
        format!("{} {}", song.artist, song.title)
    } else {
        song.title.clone()
    }
}

/// iTunes-backed [`ArtworkProvider`]
#[derive(Debug, Clone)]
pub struct ItunesArtwork {
    client: Client,
    base_url: String,
}

impl ItunesArtwork {
    /// Provider with default settings
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_ITUNES_BASE, HttpSettings::default())
    }

    /// Provider pointing at another base URL
    pub fn with_base_url(base_url: impl Into<String>, http: HttpSettings) -> Result<Self> {
        Ok(Self {
            client: http.build_client()?,
            base_url: base_url.into(),
        })
    }

    /// Provider sharing an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ArtworkProvider for ItunesArtwork {
    fn name(&self) -> &str {
        "itunes"
    }

    async fn find_artwork(&self, song: &SongInfo) -> Result<Option<String>> {
        let url = format!("{}/search", trim_base(&self.base_url));
        let term = search_term(song);
        tracing::debug!(%term, "Searching iTunes artwork");

        let response = self
            .client
            .get(&url)
            .query(&[("term", term.as_str()), ("entity", "song"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }

        // iTunes answers with text/javascript, so decode the body ourselves
        let body = response.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)?;

        Ok(data
            .results
            .into_iter()
            .next()
            .and_then(|result| result.artwork_url100))
    }
}
