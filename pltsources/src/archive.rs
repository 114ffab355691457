//! HTTP client for the chat-log archive
//!
//! The archive exposes the messages of one user in one channel as plain
//! text, one message per line. With the `reverse` query flag the newest
//! message comes first, which is the order the playlist parser expects.
//!
//! # Example
//!
//! ```no_run
//! use pltsources::ArchiveClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ArchiveClient::builder()
//!         .channel("quin69")
//!         .user("sheepfarmer")
//!         .build()?;
//!
//!     let lines = client.fetch_lines().await?;
//!     println!("{} lines", lines.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::http::{trim_base, HttpSettings};
use crate::traits::LogSource;
use async_trait::async_trait;
use pltplaylist::split_log_lines;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default chat-log archive base URL
pub const DEFAULT_ARCHIVE_BASE: &str = "https://logs.ivr.fi";

/// Default channel whose chat is archived
pub const DEFAULT_CHANNEL: &str = "quin69";

/// Default user posting the song-request announcements
pub const DEFAULT_REQUEST_BOT: &str = "sheepfarmer";

/// Chat-log archive client
///
/// Stateless: every call hits the archive with `Cache-Control: no-cache`
/// so the playlist always reflects the latest messages.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
    channel: String,
    user: String,
}

impl ArchiveClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ArchiveClientBuilder {
        ArchiveClientBuilder::default()
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// URL of the newest-first log of the configured user
    ///
    /// ```
    /// use pltsources::ArchiveClient;
    ///
    /// let client = ArchiveClient::new().unwrap();
    /// assert_eq!(
    ///     client.log_url().unwrap().as_str(),
    ///     "https://logs.ivr.fi/channel/quin69/user/sheepfarmer/?reverse"
    /// );
    /// ```
    pub fn log_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/channel/{}/user/{}/",
            trim_base(&self.base_url),
            self.channel,
            self.user
        ))?;
        url.set_query(Some("reverse"));
        Ok(url)
    }

    /// Fetch the raw archive text
    pub async fn fetch_text(&self) -> Result<String> {
        let url = self.log_url()?;
        tracing::debug!("Fetching chat log: {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }

        Ok(response.text().await?)
    }

    /// Fetch the archive and split it into non-blank lines, newest first
    pub async fn fetch_lines(&self) -> Result<Vec<String>> {
        let text = self.fetch_text().await?;
        let lines: Vec<String> = split_log_lines(&text)
            .into_iter()
            .map(str::to_string)
            .collect();
        tracing::debug!(channel = %self.channel, lines = lines.len(), "Received chat log");
        Ok(lines)
    }
}

#[async_trait]
impl LogSource for ArchiveClient {
    async fn fetch_lines(&self) -> Result<Vec<String>> {
        ArchiveClient::fetch_lines(self).await
    }
}

/// Builder for configuring an [`ArchiveClient`]
#[derive(Debug)]
pub struct ArchiveClientBuilder {
    client: Option<Client>,
    base_url: String,
    channel: String,
    user: String,
    http: HttpSettings,
}

impl Default for ArchiveClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_ARCHIVE_BASE.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            user: DEFAULT_REQUEST_BOT.to_string(),
            http: HttpSettings::default(),
        }
    }
}

impl ArchiveClientBuilder {
    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the archive base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the channel whose chat is read
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the user posting the request announcements
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
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

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http.proxy = Some(proxy.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ArchiveClient> {
        let client = match self.client {
            Some(client) => client,
            None => self.http.build_client()?,
        };

        Ok(ArchiveClient {
            client,
            base_url: self.base_url,
            channel: self.channel,
            user: self.user,
        })
    }
}
