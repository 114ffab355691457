//! Album artwork lookup
//!
//! Artwork is best effort: the rendering layer shows a placeholder when no
//! image is found, so providers report "not found" as `Ok(None)` and keep
//! errors for transport or authentication problems. [`ArtworkChain`] tries
//! several providers in order and swallows their errors.

pub mod itunes;
pub mod spotify;

use crate::error::Result;
use async_trait::async_trait;
use pltplaylist::SongInfo;
use std::sync::Arc;

pub use itunes::ItunesArtwork;
pub use spotify::{AccessToken, SpotifyArtwork, SpotifyCredentials, TokenCache};

/// A service able to find cover art for a song
#[async_trait]
pub trait ArtworkProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// URL of a cover image for `song`, or `None` if the service has none
    async fn find_artwork(&self, song: &SongInfo) -> Result<Option<String>>;
}

/// Tries providers in order until one returns an image
#[derive(Clone, Default)]
pub struct ArtworkChain {
    providers: Vec<Arc<dyn ArtworkProvider>>,
}

impl std::fmt::Debug for ArtworkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtworkChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ArtworkChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider at the end of the chain
    pub fn with_provider(mut self, provider: Arc<dyn ArtworkProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn push(&mut self, provider: Arc<dyn ArtworkProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up artwork for a raw display string (`"Artist - Title"`)
    pub async fn find_for_title(&self, display: &str) -> Option<String> {
        if display.trim().is_empty() {
            return None;
        }
        self.find_artwork(&SongInfo::parse(display))
            .await
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtworkProvider for ArtworkChain {
    fn name(&self) -> &str {
        "chain"
    }

    /// Never fails: provider errors are logged and the next one is tried
    async fn find_artwork(&self, song: &SongInfo) -> Result<Option<String>> {
        for provider in &self.providers {
            match provider.find_artwork(song).await {
                Ok(Some(url)) => {
                    tracing::debug!(provider = provider.name(), %url, "Artwork found");
                    return Ok(Some(url));
                }
                Ok(None) => {
                    tracing::debug!(
                        provider = provider.name(),
                        artist = %song.artist,
                        title = %song.title,
                        "No artwork"
                    );
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "Artwork lookup failed: {}", e);
                }
            }
        }
        Ok(None)
    }
}
