//! Page content fetching
//!
//! This module defines how the search obtains page markup:
//! - The `PageFetcher` seam the orchestrator depends on
//! - An HTTP implementation built on reqwest
//! - Client construction with the configured user agent and timeouts

use crate::config::{FetcherConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while retrieving page markup
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Fetch failed for {url}: {message}")]
    Other { url: String, message: String },
}

/// Outcome of a retrieval that reached the content source
///
/// `success == false` means the source answered but had no usable markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    pub success: bool,
    pub html: Option<String>,
}

impl PageContent {
    /// Markup was retrieved
    pub fn found(html: impl Into<String>) -> Self {
        Self {
            success: true,
            html: Some(html.into()),
        }
    }

    /// The source reported that it could not retrieve the page
    pub fn unavailable() -> Self {
        Self {
            success: false,
            html: None,
        }
    }

    /// Returns the markup only when retrieval succeeded
    pub fn into_markup(self) -> Option<String> {
        if self.success {
            self.html
        } else {
            None
        }
    }
}

/// Retrieves raw markup for a page URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client for fetching page markup
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `fetcher` - Request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(fetcher.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches page markup directly from the page's origin
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetcher: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, fetcher)?))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    /// # Response Mapping
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Unparseable or non-HTTP(S) URL | `Err(InvalidUrl)` |
    /// | Transport failure / timeout | `Err(Http)` |
    /// | Non-2xx status | `Ok(unavailable)` |
    /// | 2xx with readable body | `Ok(found)` |
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Fetch of {} returned HTTP {}", url, status.as_u16());
            return Ok(PageContent::unavailable());
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(PageContent::found(body))
    }
}
