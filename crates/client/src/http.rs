//! Request and response model shared by the fetcher, strategies and service.

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use swcache_core::cache::hash::request_key;
use swcache_core::{CachedResponse, Error};
use url::Url;

pub use reqwest::{Method, StatusCode};

/// How the request was initiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Full-page load.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

/// An outgoing request as seen by the interception point.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub mode: RequestMode,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), mode: RequestMode::default() }
    }

    /// A GET request with no headers.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Set a header, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the `Accept` header. Values that are not valid header text are ignored.
    pub fn with_accept(self, accept: &str) -> Self {
        match HeaderValue::from_str(accept) {
            Ok(value) => self.with_header(header::ACCEPT, value),
            Err(_) => self,
        }
    }

    /// Mark the request as a full-page navigation.
    pub fn navigate(mut self) -> Self {
        self.mode = RequestMode::Navigate;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// The `Accept` header, if present and textual.
    pub fn accept(&self) -> Option<&str> {
        self.headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
    }

    /// Canonical cache identity: `"<METHOD> <absolute-url>"`.
    pub fn key(&self) -> String {
        request_key(self.method.as_str(), self.url.as_str())
    }

    /// Only GET requests over http(s) may enter the cache.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET && matches!(self.url.scheme(), "http" | "https")
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// Built by the service itself after a failure.
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// A response handed back to the caller.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: ResponseSource,
}

/// Header carrying the error kind on synthetic responses.
pub const ERROR_HEADER: &str = "x-swcache-error";

impl Response {
    /// Status is in the 200–299 range.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Snapshot this response for storage under `request`'s key.
    pub fn to_cached(&self, generation: &str, request: &Request) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        CachedResponse {
            generation: generation.to_string(),
            key: request.key(),
            method: request.method.to_string(),
            url: request.url.to_string(),
            status: self.status.as_u16(),
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: self.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rebuild a response from a stored entry.
    pub fn from_cached(entry: CachedResponse) -> Result<Self, Error> {
        let url = Url::parse(&entry.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let status = StatusCode::from_u16(entry.status)
            .map_err(|e| Error::WorkerFault(format!("stored status {}: {e}", entry.status)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &entry.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                headers.append(name, value);
            }
        }

        Ok(Self { url, status, headers, body: Bytes::from(entry.body), source: ResponseSource::Cache })
    }

    /// A well-formed 503 response describing `err`.
    pub fn synthetic_error(url: Url, err: &Error) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        headers.insert(HeaderName::from_static(ERROR_HEADER), HeaderValue::from_static(err.kind()));

        Self {
            url,
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::from(format!("Offline: {err}")),
            source: ResponseSource::Synthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_request_key() {
        let request = Request::get(url("https://example.com/logos/logo.jpeg"));
        assert_eq!(request.key(), "GET https://example.com/logos/logo.jpeg");
    }

    #[test]
    fn test_is_cacheable() {
        assert!(Request::get(url("http://example.com/")).is_cacheable());
        assert!(!Request::new(Method::POST, url("https://example.com/api/x")).is_cacheable());
        assert!(!Request::get(url("chrome-extension://abc/script.js")).is_cacheable());
        assert!(!Request::get(url("data:text/plain,hello")).is_cacheable());
    }

    #[test]
    fn test_accept_and_mode() {
        let request = Request::get(url("https://example.com/")).with_accept("text/html").navigate();
        assert_eq!(request.accept(), Some("text/html"));
        assert!(request.is_navigation());
        assert_eq!(Request::get(url("https://example.com/")).mode, RequestMode::Cors);
    }

    #[test]
    fn test_cached_round_trip_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        let response = Response {
            url: url("https://example.com/a.png"),
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"png"),
            source: ResponseSource::Network,
        };
        let request = Request::get(url("https://example.com/a.png"));

        let entry = response.to_cached("static-v1", &request);
        assert_eq!(entry.key, "GET https://example.com/a.png");
        assert_eq!(entry.status_text, "OK");

        let restored = Response::from_cached(entry).unwrap();
        assert_eq!(restored.source, ResponseSource::Cache);
        assert_eq!(restored.content_type(), Some("image/png"));
        assert_eq!(restored.body, Bytes::from_static(b"png"));
    }

    #[test]
    fn test_synthetic_error() {
        let err = Error::NetworkFailure("offline".into());
        let response = Response::synthetic_error(url("https://example.com/api/x"), &err);
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!response.is_ok());
        assert_eq!(response.headers.get(ERROR_HEADER).unwrap(), "network-failure");
        assert_eq!(response.source, ResponseSource::Synthetic);
    }
}
