//! Request classification.
//!
//! Rules, first match wins:
//! 1. static-asset suffix → cache-first
//! 2. API prefix → network-first
//! 3. `Accept: text/html` → stale-while-revalidate
//! 4. anything else → network-first

use regex::Regex;
use swcache_core::Error;

use super::Strategy;
use crate::http::Request;

/// Kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestClass {
    StaticAsset,
    ApiCall,
    NavigationDocument,
    Other,
}

impl RequestClass {
    /// Strategy used for this class.
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::StaticAsset => Strategy::CacheFirst,
            RequestClass::ApiCall => Strategy::NetworkFirst,
            RequestClass::NavigationDocument => Strategy::StaleWhileRevalidate,
            RequestClass::Other => Strategy::NetworkFirst,
        }
    }
}

/// Pure classifier from request URL and headers to a strategy.
#[derive(Debug, Clone)]
pub struct Selector {
    static_extensions: Vec<String>,
    api_patterns: Vec<Regex>,
}

impl Selector {
    /// Build a selector from suffixes (`.js`) and path prefixes (`/api/`).
    ///
    /// Suffixes match case-insensitively; prefixes are literal and anchored
    /// at the start of the path.
    pub fn new(static_extensions: &[String], api_prefixes: &[String]) -> Result<Self, Error> {
        let api_patterns = api_prefixes
            .iter()
            .map(|prefix| {
                Regex::new(&format!("^{}", regex::escape(prefix)))
                    .map_err(|e| Error::InvalidInput(format!("api prefix '{prefix}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { static_extensions: static_extensions.iter().map(|e| e.to_ascii_lowercase()).collect(), api_patterns })
    }

    pub fn classify(&self, request: &Request) -> RequestClass {
        let path = request.url.path();
        let lowered = path.to_ascii_lowercase();

        if self.static_extensions.iter().any(|ext| lowered.ends_with(ext.as_str())) {
            return RequestClass::StaticAsset;
        }

        if self.api_patterns.iter().any(|pattern| pattern.is_match(path)) {
            return RequestClass::ApiCall;
        }

        if request.accept().is_some_and(|accept| accept.contains("text/html")) {
            return RequestClass::NavigationDocument;
        }

        RequestClass::Other
    }

    pub fn select(&self, request: &Request) -> Strategy {
        self.classify(request).strategy()
    }
}
