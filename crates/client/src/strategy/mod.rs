//! Fetch strategies pairing cache lookups with network retrieval.
//!
//! | strategy                 | generation | network                          |
//! |--------------------------|------------|----------------------------------|
//! | `CacheFirst`             | static     | only on miss                     |
//! | `NetworkFirst`           | dynamic    | always, cache on failure/guard   |
//! | `StaleWhileRevalidate`   | dynamic    | always, in the background        |
//! | `PassThrough`            | none       | always, nothing stored           |
//!
//! Only 2xx responses are written. Store failures are logged and never fail
//! a request. Every network call runs on its own task, so a panicking fetcher
//! surfaces as `Error::WorkerFault` instead of unwinding into the caller.

pub mod selector;

use std::sync::Arc;

use swcache_core::{CacheDb, Error};

use crate::fetch::{Fetcher, check_dev_url};
use crate::http::{Request, Response};

pub use selector::{RequestClass, Selector};

/// Algorithm used to answer one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
    PassThrough,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
            Strategy::PassThrough => "pass-through",
        }
    }
}

/// Runs strategies against one store and one fetcher.
#[derive(Clone)]
pub struct StrategyExecutor {
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    static_cache: String,
    dynamic_cache: String,
}

impl StrategyExecutor {
    pub fn new(db: CacheDb, fetcher: Arc<dyn Fetcher>, static_cache: String, dynamic_cache: String) -> Self {
        Self { db, fetcher, static_cache, dynamic_cache }
    }

    /// Generation a strategy reads from and writes to.
    pub fn generation_for(&self, strategy: Strategy) -> Option<&str> {
        match strategy {
            Strategy::CacheFirst => Some(&self.static_cache),
            Strategy::NetworkFirst | Strategy::StaleWhileRevalidate => Some(&self.dynamic_cache),
            Strategy::PassThrough => None,
        }
    }

    pub async fn execute(&self, strategy: Strategy, request: &Request) -> Result<Response, Error> {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request, &self.static_cache).await,
            Strategy::NetworkFirst => self.network_first(request, &self.dynamic_cache).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, &self.dynamic_cache).await,
            Strategy::PassThrough => self.fetch(request).await,
        }
    }

    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let fetcher = Arc::clone(&self.fetcher);
        let request = request.clone();
        tokio::spawn(async move { fetcher.fetch(&request).await })
            .await
            .map_err(|e| Error::WorkerFault(format!("fetch task: {e}")))?
    }

    async fn cache_first(&self, request: &Request, generation: &str) -> Result<Response, Error> {
        if let Some(cached) = self.lookup(generation, request).await {
            tracing::debug!("cache hit in {generation} for {}", request.url);
            return Ok(cached);
        }

        let response = self.fetch(request).await?;
        self.store(generation, request, &response).await;
        Ok(response)
    }

    async fn network_first(&self, request: &Request, generation: &str) -> Result<Response, Error> {
        let attempt = match check_dev_url(&request.url) {
            Ok(()) => self.fetch(request).await,
            Err(guard) => Err(Error::InvalidRequestGuard(guard.to_string())),
        };

        match attempt {
            Ok(response) => {
                self.store(generation, request, &response).await;
                Ok(response)
            }
            Err(err) => {
                tracing::debug!("network-first falling back to {generation} for {}: {err}", request.url);
                self.lookup(generation, request).await.ok_or(err)
            }
        }
    }

    async fn stale_while_revalidate(&self, request: &Request, generation: &str) -> Result<Response, Error> {
        let cached = self.lookup(generation, request).await;

        let executor = self.clone();
        let background = request.clone();
        let target = generation.to_string();
        let revalidation = tokio::spawn(async move {
            match executor.fetch(&background).await {
                Ok(response) => {
                    executor.store(&target, &background, &response).await;
                    Ok(response)
                }
                Err(err) => {
                    tracing::debug!("revalidation of {} failed: {err}", background.url);
                    Err(err)
                }
            }
        });

        match cached {
            Some(response) => {
                tracing::debug!("serving stale {} while revalidating", request.url);
                Ok(response)
            }
            None => revalidation
                .await
                .map_err(|e| Error::WorkerFault(format!("revalidation task: {e}")))?,
        }
    }

    /// Cache lookup; store errors count as a miss.
    async fn lookup(&self, generation: &str, request: &Request) -> Option<Response> {
        let found = match self.db.match_entry(generation, &request.key()).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!("cache lookup in {generation} failed for {}: {err}", request.url);
                return None;
            }
        };

        match Response::from_cached(found?) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::warn!("discarding unreadable entry for {}: {err}", request.url);
                None
            }
        }
    }

    /// Write-through of 2xx responses.
    async fn store(&self, generation: &str, request: &Request, response: &Response) {
        if !response.is_ok() {
            tracing::debug!("not caching {} (status {})", request.url, response.status.as_u16());
            return;
        }

        if let Err(err) = self.db.put_entry(&response.to_cached(generation, request)).await {
            tracing::warn!("failed to cache {} in {generation}: {err}", request.url);
        }
    }
}
