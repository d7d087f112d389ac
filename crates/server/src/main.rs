//! swcache server entry point.
//!
//! Boots the cache service and exposes it as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{AssetCache, CacheService, FetchClient, FetchConfig, ServiceConfig};
use swcache_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        static_cache = %config.static_cache_name(),
        dynamic_cache = %config.dynamic_cache_name(),
        "Starting swcache server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    tracing::debug!(
        user_agent = %fetcher.config().user_agent,
        timeout = ?fetcher.config().timeout,
        "HTTP client ready"
    );

    let service = CacheService::new(ServiceConfig::from_app_config(&config)?, db.clone(), fetcher.clone())?
        .with_notifier(Arc::new(host::LogNotifier))
        .with_offline_queue(Arc::new(host::LogOfflineQueue));
    let assets = AssetCache::new(fetcher, config.asset_dir.clone());

    let handler = handler::SwCacheServer::new(Arc::new(service), Arc::new(assets));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    db.close().await?;

    Ok(())
}
