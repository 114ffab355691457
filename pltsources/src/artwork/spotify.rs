//! Spotify artwork lookup
//!
//! Uses the client-credentials flow: a bearer token is requested with the
//! application id and secret, then cached until one minute before Spotify
//! says it expires. Searches try progressively looser queries and stop at
//! the first track carrying an album image.

use super::ArtworkProvider;
use crate::error::{Error, Result};
use crate::http::{trim_base, HttpSettings};
use async_trait::async_trait;
use pltplaylist::SongInfo;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default Spotify accounts service (token endpoint host)
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Default Spotify Web API base URL
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Environment variable holding the application id
pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";

/// Environment variable holding the application secret
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";

/// Tokens are considered expired this long before Spotify's deadline
pub const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials for the client-credentials flow
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

impl SpotifyCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`
    ///
    /// Returns `None` and logs which variable is missing when either one is
    /// unset or empty.
    pub fn from_env() -> Option<Self> {
        let client_id = env::var(ENV_CLIENT_ID).ok().filter(|v| !v.is_empty());
        let client_secret = env::var(ENV_CLIENT_SECRET).ok().filter(|v| !v.is_empty());

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(Self::new(client_id, client_secret)),
            (client_id, client_secret) => {
                let missing: Vec<&str> = [(ENV_CLIENT_ID, client_id), (ENV_CLIENT_SECRET, client_secret)]
                    .into_iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                tracing::debug!("Spotify credentials not configured, missing {}", missing.join(", "));
                None
            }
        }
    }
}

// ============================================================================
// Token cache
// ============================================================================

/// Bearer token with its local expiry instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Instant,
}

impl AccessToken {
    /// Token valid for `expires_in` minus [`TOKEN_EXPIRY_MARGIN`], counted from `now`
    pub fn new(token: impl Into<String>, expires_in: Duration, now: Instant) -> Self {
        Self {
            token: token.into(),
            expires_at: now + expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN),
        }
    }

    pub fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Holds at most one token; shared by all searches of a provider
///
/// ```
/// use pltsources::{artwork::AccessToken, TokenCache};
/// use std::time::{Duration, Instant};
///
/// # tokio_test::block_on(async {
/// let cache = TokenCache::new();
/// let now = Instant::now();
/// cache.store(AccessToken::new("abc", Duration::from_secs(3600), now)).await;
/// assert_eq!(cache.get(now).await.as_deref(), Some("abc"));
/// // expires one minute early
/// assert_eq!(cache.get(now + Duration::from_secs(3540)).await, None);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token if still valid at `now`
    pub async fn get(&self, now: Instant) -> Option<String> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|token| token.is_valid(now))
            .map(|token| token.token.clone())
    }

    pub async fn store(&self, token: AccessToken) {
        *self.slot.lock().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}

// ============================================================================
// API payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    #[serde(default)]
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

impl SearchResponse {
    fn first_image(self) -> Option<String> {
        self.tracks?
            .items
            .into_iter()
            .next()?
            .album?
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
    }
}

/// Queries tried in order for a song, from strictest to loosest
pub fn search_queries(song: &SongInfo) -> Vec<String> {
    vec![
        format!("artist:{} track:{}", song.artist, song.title),
        format!("{} {}", song.title, song.artist),
        song.title.clone(),
    ]
}

// ============================================================================
// Provider
// ============================================================================

/// Spotify-backed [`ArtworkProvider`]
#[derive(Debug)]
pub struct SpotifyArtwork {
    client: Client,
    accounts_url: String,
    api_url: String,
    credentials: Option<SpotifyCredentials>,
    tokens: TokenCache,
}

impl SpotifyArtwork {
    /// Provider with default endpoints and the given credentials
    pub fn new(credentials: Option<SpotifyCredentials>) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    pub fn builder() -> SpotifyArtworkBuilder {
        SpotifyArtworkBuilder::default()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Valid bearer token, requesting a new one when the cache is empty or stale
    pub async fn access_token(&self) -> Result<String> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            Error::MissingCredentials(format!("{} / {}", ENV_CLIENT_ID, ENV_CLIENT_SECRET))
        })?;

        if let Some(token) = self.tokens.get(Instant::now()).await {
            return Ok(token);
        }

        let url = format!("{}/api/token", trim_base(&self.accounts_url));
        tracing::debug!("Requesting Spotify access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Failed to get Spotify token: {} {}", status, body.trim());
            return Err(Error::Auth(format!("token endpoint returned {}", status)));
        }

        let data: TokenResponse = response.json().await?;
        let token = AccessToken::new(
            data.access_token,
            Duration::from_secs(data.expires_in),
            Instant::now(),
        );
        let value = token.token.clone();
        self.tokens.store(token).await;
        Ok(value)
    }

    /// Run one search query; `Ok(None)` for misses and non-success statuses
    async fn search(&self, token: &str, query: &str) -> Result<Option<String>> {
        let url = format!("{}/search", trim_base(&self.api_url));
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // token revoked before its announced expiry
            self.tokens.clear().await;
        }
        if !status.is_success() {
            tracing::debug!(%query, %status, "Spotify search attempt failed");
            return Ok(None);
        }

        let data: SearchResponse = response.json().await?;
        let found = data.first_image();
        tracing::debug!(%query, found = found.is_some(), "Spotify search attempt");
        Ok(found)
    }
}

#[async_trait]
impl ArtworkProvider for SpotifyArtwork {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn find_artwork(&self, song: &SongInfo) -> Result<Option<String>> {
        let token = self.access_token().await?;
        for query in search_queries(song) {
            if let Some(url) = self.search(&token, &query).await? {
                return Ok(Some(url));
            }
        }
        Ok(None)
    }
}

/// Builder for configuring a [`SpotifyArtwork`] provider
#[derive(Debug)]
pub struct SpotifyArtworkBuilder {
    client: Option<Client>,
    accounts_url: String,
    api_url: String,
    credentials: Option<SpotifyCredentials>,
    http: HttpSettings,
}

impl Default for SpotifyArtworkBuilder {
    fn default() -> Self {
        Self {
            client: None,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            credentials: None,
            http: HttpSettings::default(),
        }
    }
}

impl SpotifyArtworkBuilder {
    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the accounts service URL (token endpoint host)
    pub fn accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into();
        self
    }

    /// Set the Web API base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn credentials(mut self, credentials: Option<SpotifyCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<SpotifyArtwork> {
        let client = match self.client {
            Some(client) => client,
            None => self.http.build_client()?,
        };

        Ok(SpotifyArtwork {
            client,
            accounts_url: self.accounts_url,
            api_url: self.api_url,
            credentials: self.credentials,
            tokens: TokenCache::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_token_response() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_access_token_expiry_margin() {
        let now = Instant::now();
        let token = AccessToken::new("t", Duration::from_secs(3600), now);
        assert!(token.is_valid(now));
        assert!(token.is_valid(now + Duration::from_secs(3539)));
        assert!(!token.is_valid(now + Duration::from_secs(3540)));
    }

    #[test]
    fn test_short_lived_token_is_immediately_stale() {
        let now = Instant::now();
        let token = AccessToken::new("t", Duration::from_secs(30), now);
        assert!(!token.is_valid(now));
    }

    #[tokio::test]
    async fn test_token_cache() {
        let cache = TokenCache::new();
        let now = Instant::now();
        assert_eq!(cache.get(now).await, None);

        cache
            .store(AccessToken::new("abc", Duration::from_secs(120), now))
            .await;
        assert_eq!(cache.get(now).await.as_deref(), Some("abc"));
        assert_eq!(cache.get(now + Duration::from_secs(61)).await, None);

        cache.clear().await;
        assert_eq!(cache.get(now).await, None);
    }

    #[test]
    fn test_search_queries() {
        let queries = search_queries(&SongInfo::parse("Daft Punk - Aerodynamic"));
        assert_eq!(
            queries,
            vec![
                "artist:Daft Punk track:Aerodynamic",
                "Aerodynamic Daft Punk",
                "Aerodynamic",
            ]
        );
    }

    #[test]
    fn test_first_image() {
        let data: SearchResponse = serde_json::from_value(serde_json::json!({
            "tracks": { "items": [ { "album": { "images": [
                { "url": "https://i.scdn.co/image/large", "height": 640, "width": 640 },
                { "url": "https://i.scdn.co/image/small", "height": 64, "width": 64 }
            ] } } ] }
        }))
        .unwrap();
        assert_eq!(data.first_image().as_deref(), Some("https://i.scdn.co/image/large"));

        let empty: SearchResponse =
            serde_json::from_value(serde_json::json!({ "tracks": { "items": [] } })).unwrap();
        assert_eq!(empty.first_image(), None);

        let no_images: SearchResponse = serde_json::from_value(serde_json::json!({
            "tracks": { "items": [ { "album": { "images": [] } } ] }
        }))
        .unwrap();
        assert_eq!(no_images.first_image(), None);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let provider = SpotifyArtwork::new(None).unwrap();
        assert!(!provider.has_credentials());
        let err = provider
            .find_artwork(&SongInfo::parse("A - X"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredentials(_)));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = SpotifyCredentials::new("id", "very-secret");
        assert!(!format!("{:?}", creds).contains("very-secret"));
    }
}
