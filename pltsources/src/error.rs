//! Error types for the PLTracker HTTP sources

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the archive, uptime or artwork services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API returned an error status
    #[error("API error: {0}")]
    ApiError(String),

    /// Authentication against the artwork service failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Artwork service credentials are not configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Build an API error from a non-success response, consuming its body
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            Self::api_error(format!("{} returned status {}", url, status))
        } else {
            Self::api_error(format!("{} returned status {}: {}", url, status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::api_error("https://example.org returned status 503");
        assert!(matches!(err, Error::ApiError(_)));
        assert_eq!(err.to_string(), "API error: https://example.org returned status 503");
        assert_eq!(Error::other("boom").to_string(), "boom");
    }
}
