//! Stream liveness check through a plain-text uptime service
//!
//! The service answers with a human readable uptime ("2 hours, 3 minutes")
//! when the channel is live, and with a sentence mentioning "offline" (or an
//! error message) otherwise.

use crate::error::{Error, Result};
use crate::http::{trim_base, HttpSettings};
use crate::traits::LivenessProbe;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default uptime service base URL
pub const DEFAULT_UPTIME_BASE: &str = "https://decapi.me";

/// Markers that mean the stream is not live
pub const NOT_LIVE_INDICATORS: &[&str] = &["offline", "error"];

/// Interpreted answer of the uptime service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamStatus {
    /// The stream is live; carries the uptime text as returned
    Live { uptime: String },
    /// The stream is offline, or the service could not tell
    Offline,
}

impl StreamStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, StreamStatus::Live { .. })
    }
}

/// Classify an uptime response body
///
/// Any body containing "offline" or "error" (case-insensitive), and any
/// blank body, means not live.
///
/// ```
/// use pltsources::{classify_uptime, StreamStatus};
///
/// assert!(classify_uptime("3 hours, 2 minutes").is_live());
/// assert_eq!(classify_uptime("quin69 is offline"), StreamStatus::Offline);
/// assert_eq!(classify_uptime("   "), StreamStatus::Offline);
/// ```
pub fn classify_uptime(text: &str) -> StreamStatus {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return StreamStatus::Offline;
    }
    let lower = trimmed.to_lowercase();
    if NOT_LIVE_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
    {
        return StreamStatus::Offline;
    }
    StreamStatus::Live {
        uptime: trimmed.to_string(),
    }
}

/// Uptime service client
#[derive(Debug, Clone)]
pub struct StreamStatusClient {
    client: Client,
    base_url: String,
    channel: String,
}

impl StreamStatusClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> StreamStatusClientBuilder {
        StreamStatusClientBuilder::default()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// URL of the uptime endpoint for the configured channel
    pub fn uptime_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/twitch/uptime/{}",
            trim_base(&self.base_url),
            self.channel
        ))?)
    }

    /// Query the uptime service
    pub async fn status(&self) -> Result<StreamStatus> {
        let url = self.uptime_url()?;
        tracing::debug!("Checking stream status: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }

        let status = classify_uptime(&response.text().await?);
        tracing::debug!(channel = %self.channel, ?status, "Stream status");
        Ok(status)
    }

    /// `true` when the stream is live
    pub async fn is_live(&self) -> Result<bool> {
        Ok(self.status().await?.is_live())
    }
}

#[async_trait]
impl LivenessProbe for StreamStatusClient {
    async fn is_live(&self) -> Result<bool> {
        StreamStatusClient::is_live(self).await
    }
}

/// Builder for configuring a [`StreamStatusClient`]
#[derive(Debug)]
pub struct StreamStatusClientBuilder {
    client: Option<Client>,
    base_url: String,
    channel: String,
    http: HttpSettings,
}

impl Default for StreamStatusClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_UPTIME_BASE.to_string(),
            channel: crate::archive::DEFAULT_CHANNEL.to_string(),
            http: HttpSettings::default(),
        }
    }
}

impl StreamStatusClientBuilder {
    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the uptime service base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the channel to check
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
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

    /// Build the client
    pub fn build(self) -> Result<StreamStatusClient> {
        let client = match self.client {
            Some(client) => client,
            None => self.http.build_client()?,
        };

        Ok(StreamStatusClient {
            client,
            base_url: self.base_url,
            channel: self.channel,
        })
    }
}
