//! cache_get tool implementation.
//!
//! Looks up the stored response for a GET request, either in one named
//! generation or across all of them.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::CacheService;
use swcache_core::{CachedResponse, Error, cache::hash::request_key};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL or path relative to the configured origin.
    pub url: String,

    /// Restrict the lookup to this generation.
    #[serde(default)]
    pub generation: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub generation: String,
    pub key: String,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub stored_at: String,
    pub body_bytes: usize,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

impl From<CachedResponse> for CacheGetOutput {
    fn from(entry: CachedResponse) -> Self {
        Self {
            body_bytes: entry.body.len(),
            body: String::from_utf8_lossy(&entry.body).into_owned(),
            generation: entry.generation,
            key: entry.key,
            url: entry.url,
            status: entry.status,
            status_text: entry.status_text,
            headers: entry.headers,
            stored_at: entry.stored_at,
        }
    }
}

/// Implementation of the cache_get tool.
pub async fn get_impl(service: &CacheService, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = service.request(&params.url)?;
    let key = request_key("GET", request.url.as_str());

    let entry = match params.generation.as_deref() {
        Some(generation) => service.db().match_entry(generation, &key).await?,
        None => service.db().match_any(&key).await?,
    }
    .ok_or_else(|| Error::CacheMiss(key.clone()))?;

    json_result(&CacheGetOutput::from(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::lifecycle::install_impl;
    use crate::tools::test_support::{ORIGIN, output, service};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let service = service(Vec::new()).await;
        let params = CacheGetParams { url: "/nonexistent".to_string(), generation: None };

        let err = get_impl(&service, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let service = service(Vec::new()).await;
        install_impl(&service).await.unwrap();

        let params = CacheGetParams { url: "/index.html".to_string(), generation: None };
        let result = get_impl(&service, params).await.unwrap();
        let out: CacheGetOutput = output(&result);

        assert_eq!(out.generation, "static-v1");
        assert_eq!(out.key, format!("GET {ORIGIN}/index.html"));
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "/index.html");
    }

    #[tokio::test]
    async fn test_get_impl_scoped_to_generation() {
        let service = service(Vec::new()).await;
        install_impl(&service).await.unwrap();

        let params = CacheGetParams { url: "/index.html".to_string(), generation: Some("dynamic-v1".into()) };
        assert!(get_impl(&service, params).await.is_err());
    }
}
