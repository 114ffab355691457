//! Shared HTTP client construction

use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PLTracker/0.1.0 (pltsources)";

/// Settings shared by every client builder
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl HttpSettings {
    /// Build a `reqwest::Client` from these settings
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout);

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build()?)
    }
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HttpSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert!(settings.build_client().is_ok());
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("https://example.com//"), "https://example.com");
        assert_eq!(trim_base("https://example.com"), "https://example.com");
    }
}
