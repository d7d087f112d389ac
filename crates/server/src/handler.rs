//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    asset::{AssetResolveParams, resolve_impl},
    cache::{CacheGetParams, CacheListParams, CachePurgeParams, get_impl, list_impl, purge_impl},
    events::{SwPushParams, SwSyncParams, push_impl, sync_impl},
    fetch::{SwFetchParams, fetch_impl},
    lifecycle::{activate_impl, install_impl},
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_client::{AssetCache, CacheService};

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    tool_router: ToolRouter<Self>,
    service: Arc<CacheService>,
    assets: Arc<AssetCache>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler.
    pub fn new(service: Arc<CacheService>, assets: Arc<AssetCache>) -> Self {
        Self { tool_router: Self::tool_router(), service, assets }
    }

    #[tool(description = "Run the install step: pre-cache the critical resources into the static generation.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.service).await
    }

    #[tool(description = "Run the activate step: delete every cache generation not in the current allow-list.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.service).await
    }

    /// Route a request through the interception point.
    ///
    /// Returns the response the service produced, or the plain network response
    /// for requests it does not intercept.
    #[tool(
        description = "Fetch a URL or origin-relative path through the cache. Reports strategy, status, source and body."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.service, params.0).await
    }

    #[tool(description = "Look up the cached response for a URL, in one generation or across all of them.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.service, params.0).await
    }

    #[tool(description = "List cache generations with entry counts, or the keys stored in one generation.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.service, params.0).await
    }

    #[tool(description = "Remove a cached response by URL, or forget local asset copies.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.service, &self.assets, params.0).await
    }

    #[tool(description = "Resolve an asset URL to a local file:// copy. Returns the original URL if caching fails.")]
    async fn asset_resolve(&self, params: Parameters<AssetResolveParams>) -> Result<CallToolResult, McpError> {
        resolve_impl(&self.assets, params.0).await
    }

    #[tool(description = "Deliver a push payload and build the notification it produces.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.service, params.0).await
    }

    #[tool(description = "Deliver a background sync event with the given tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.service, params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
