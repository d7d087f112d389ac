//! cache_purge tool implementation.
//!
//! Removes single entries from the generation store and forgets local asset
//! copies.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{AssetCache, CacheService};
use swcache_core::{Error, cache::hash::request_key};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove the stored response for this URL or origin-relative path.
    #[serde(default)]
    pub url: Option<String>,

    /// Generation to remove `url` from (default: the current static and dynamic generations).
    #[serde(default)]
    pub generation: Option<String>,

    /// Forget the local copy of this asset URL.
    #[serde(default)]
    pub asset: Option<String>,

    /// Forget every memoised asset.
    #[serde(default)]
    pub clear_assets: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Generations an entry was removed from.
    pub deleted_from: Vec<String>,
    /// Number of memoised assets forgotten.
    pub forgotten_assets: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(
    service: &CacheService, assets: &AssetCache, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    if params.url.is_none() && params.asset.is_none() && !params.clear_assets {
        return Err(Error::InvalidInput("At least one of url, asset, or clear_assets must be specified".into()).into());
    }

    let mut deleted_from = Vec::new();

    if let Some(url) = params.url.as_deref() {
        let key = request_key("GET", service.request(url)?.url.as_str());
        let generations = match params.generation {
            Some(generation) => vec![generation],
            None => service.config().allow_list().into_iter().map(String::from).collect(),
        };

        for generation in generations {
            if service.db().delete_entry(&generation, &key).await? {
                tracing::debug!(generation = %generation, "purged {key}");
                deleted_from.push(generation);
            }
        }
    }

    let mut forgotten_assets = 0;

    if let Some(asset) = params.asset.as_deref()
        && assets.forget(asset).await
    {
        forgotten_assets += 1;
    }

    if params.clear_assets {
        forgotten_assets += assets.len().await;
        assets.clear().await;
    }

    json_result(&CachePurgeOutput { deleted_from, forgotten_assets })
}
