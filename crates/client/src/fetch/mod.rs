//! Network side of the cache: the `Fetcher` seam and its reqwest implementation.
//!
//! ### URL handling
//! - Root-relative paths resolve against the configured origin
//! - Lowercase host, remove fragments, preserve query string
//!
//! ### Development URL guard
//! - `localhost` without an explicit port is rejected before any network call
//! - `https` against `localhost` is rejected before any network call
//!
//! ### Status handling
//! - Every HTTP status is returned as a response; only transport failures
//!   (connect, DNS, TLS, body read) become `Error::NetworkFailure`.

pub mod guard;
pub mod url;

use bytes::Bytes;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use guard::{GuardError, check_dev_url};
pub use url::{UrlError, canonicalize, resolve};

use crate::http::{Request, Response, ResponseSource};
use swcache_core::{AppConfig, Error};

/// Network access used by the strategies, the installer and the asset cache.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request. Non-2xx statuses are not errors.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "swcache/0.1".to_string(), timeout: None, max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::WorkerFault(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers: header::HeaderMap = response.headers().clone();

        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkFailure(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: final_url, status, headers, body, source: ResponseSource::Network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { timeout_ms: Some(1500), user_agent: "custom/1.0".into(), ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "custom/1.0");
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_failure() {
        let client = FetchClient::new(FetchConfig { timeout: Some(Duration::from_secs(2)), ..Default::default() })
            .unwrap();
        // Port 9 (discard) on loopback is closed in test environments.
        let request = Request::get(::url::Url::parse("http://127.0.0.1:9/").unwrap());

        let result = client.fetch(&request).await;
        assert!(matches!(result, Err(Error::NetworkFailure(_))));
    }
}
