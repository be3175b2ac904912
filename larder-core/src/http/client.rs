//! HTTP client trait and implementations.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// Default bound on a single page fetch. One attempt, no retries.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Browser-like identity to avoid naive bot-blocking.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Larder/0.1)";

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch HTML content from a URL.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Configuration for [`FetchClient`].
#[derive(Clone)]
pub struct FetchClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Build the FetchClient.
    pub fn build(self) -> Result<FetchClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        Ok(FetchClient { inner })
    }
}

/// Production HTTP client: single GET with a bounded timeout and a
/// browser-like identity header.
pub struct FetchClient {
    inner: reqwest::Client,
}

impl FetchClient {
    /// Create a new FetchClient with default configuration.
    pub fn new() -> Result<Self, reqwest::Error> {
        FetchClientBuilder::new().build()
    }

    /// Get a builder for custom configuration.
    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url, "fetching page");
        let response = self.inner.get(parsed).send().await?;

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "request failed");
            return Err(FetchError::RequestFailed(
                response.error_for_status().unwrap_err(),
            ));
        }

        tracing::debug!(url, status = %response.status(), "fetched successfully");
        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| FetchError::InvalidEncoding(format!("Invalid UTF-8 in response: {}", e)))
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Html(String),
    Error(String),
}

/// Mock HTTP client for testing.
#[derive(Default)]
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
}

impl MockClient {
    /// Create a new empty mock client.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
        }
    }

    /// Add a response for a URL.
    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Add an HTML response for a URL.
    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Html(html.to_string()))
    }

    /// Add an error response for a URL.
    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        match self.responses.get(url) {
            Some(MockResponse::Html(html)) => Ok(html.clone()),
            Some(MockResponse::Error(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::InvalidUrl(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_returns_canned_html() {
        let client = MockClient::new().with_html("https://example.com/a", "<html></html>");
        let html = client.fetch_html("https://example.com/a").await.unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn mock_client_errors_on_unknown_url() {
        let client = MockClient::new();
        assert!(client.fetch_html("https://example.com/b").await.is_err());
    }

    #[tokio::test]
    async fn fetch_client_rejects_relative_urls() {
        let client = FetchClient::new().unwrap();
        let err = client.fetch_html("not-a-url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
