//! asset_resolve tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::AssetCache;

use super::json_result;

/// Parameters for the asset_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetResolveParams {
    /// Remote asset URL.
    pub src: String,
}

/// Output from the asset_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetResolveOutput {
    pub src: String,
    /// Local `file://` URL, or `src` when the asset could not be cached.
    pub resolved: String,
    pub cached: bool,
}

/// Never fails: an uncacheable asset resolves to itself.
pub async fn resolve_impl(assets: &AssetCache, params: AssetResolveParams) -> Result<CallToolResult, McpError> {
    let resolved = assets.resolve(&params.src).await;
    let cached = resolved != params.src;

    json_result(&AssetResolveOutput { src: params.src, resolved, cached })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{EchoFetcher, output};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_resolve_to_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetCache::new(Arc::new(EchoFetcher { failing: Vec::new() }), dir.path());

        let params = AssetResolveParams { src: "https://cdn.example.com/avatar.png".into() };
        let result = resolve_impl(&assets, params).await.unwrap();
        let out: AssetResolveOutput = output(&result);

        assert!(out.cached);
        assert!(out.resolved.starts_with("file://"));
    }

    #[tokio::test]
    async fn test_resolve_failure_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetCache::new(Arc::new(EchoFetcher { failing: vec!["/avatar.png"] }), dir.path());

        let params = AssetResolveParams { src: "https://cdn.example.com/avatar.png".into() };
        let result = resolve_impl(&assets, params).await.unwrap();
        let out: AssetResolveOutput = output(&result);

        assert!(!out.cached);
        assert_eq!(out.resolved, "https://cdn.example.com/avatar.png");
    }
}
