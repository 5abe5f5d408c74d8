//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] seam the orchestrator fetches through,
//! and its reqwest implementation:
//! - Building the HTTP client shared with the downloader
//! - GET requests that report the content type and final URL
//! - Reading bodies of HTML documents only
//! - Turning non-success statuses into errors

use crate::config::HttpSettings;
use crate::crawler::classifier::is_html;
use crate::uri::CanonicalUri;
use crate::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// A fetched resource
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Content-Type header value, empty when absent
    pub content_type: String,

    /// Body of HTML documents; `None` for any other content type
    pub body: Option<String>,

    /// Final URL after redirects, used to resolve relative links
    pub resolved_uri: Url,
}

/// Source of crawl responses
///
/// Timeouts and retries are the implementation's business; the orchestrator
/// only sees success or a [`FetchError`].
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        uri: &CanonicalUri,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Example
///
/// ```no_run
/// use sponge::config::HttpSettings;
/// use sponge::crawler::build_http_client;
///
/// let client = build_http_client(&HttpSettings::default()).unwrap();
/// ```
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &CanonicalUri) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(uri.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                uri: uri.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let resolved_uri = response.url().clone();

        // Other resources are transferred by the downloader, if at all
        let body = if is_html(&content_type) {
            let text = response.text().await.map_err(|source| FetchError::Http {
                uri: uri.to_string(),
                source,
            })?;
            Some(text)
        } else {
            None
        };

        Ok(FetchResponse {
            content_type,
            body,
            resolved_uri,
        })
    }
}
