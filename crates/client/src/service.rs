//! Lifecycle manager: install, activate and fetch interception.
//!
//! `CacheService` is constructed once with its configuration, store and
//! fetcher. Hosts call [`CacheService::handle_install`] and
//! [`CacheService::handle_activate`] on deploy, and route every outgoing
//! request through [`CacheService::handle_fetch`], which never returns an
//! error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swcache_core::cache::hash::request_key;
use swcache_core::{AppConfig, CacheDb, Error};
use tokio::sync::RwLock;
use url::Url;

use crate::events::{Notification, Notifier, OfflineQueue, PushMessage};
use crate::fetch::{Fetcher, resolve};
use crate::http::{Request, Response};
use crate::strategy::{Selector, Strategy, StrategyExecutor};

/// Construction-time settings of the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub origin: Url,
    pub static_cache: String,
    pub dynamic_cache: String,
    pub critical_resources: Vec<String>,
    pub static_extensions: Vec<String>,
    pub api_prefixes: Vec<String>,
    pub app_name: String,
    pub notification_icon: Option<String>,
    pub sync_tag: String,
}

impl ServiceConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin: {e}")))?;

        Ok(Self {
            origin,
            static_cache: config.static_cache_name(),
            dynamic_cache: config.dynamic_cache_name(),
            critical_resources: config.critical_resources.clone(),
            static_extensions: config.static_extensions.clone(),
            api_prefixes: config.api_prefixes.clone(),
            app_name: config.app_name.clone(),
            notification_icon: Some(config.notification_icon.clone()).filter(|icon| !icon.is_empty()),
            sync_tag: config.sync_tag.clone(),
        })
    }

    /// Generations that survive activation.
    pub fn allow_list(&self) -> [&str; 2] {
        [&self.static_cache, &self.dynamic_cache]
    }
}

/// Worker lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

#[derive(Debug)]
struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
    clients_claimed: bool,
}

/// A critical resource that could not be pre-cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedResource {
    pub path: String,
    pub reason: String,
}

/// Outcome of an install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub generation: String,
    pub cached: Vec<String>,
    pub failed: Vec<FailedResource>,
}

/// Outcome of an activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub retained: Vec<String>,
}

/// What the interception point decided for one request.
#[derive(Debug)]
pub enum FetchDisposition {
    /// The service answered.
    Respond(Response),
    /// Not intercepted; the host performs a plain network request.
    Fallthrough(Request),
}

/// The caching service.
pub struct CacheService {
    config: ServiceConfig,
    db: CacheDb,
    selector: Selector,
    executor: StrategyExecutor,
    lifecycle: RwLock<Lifecycle>,
    notifier: Option<Arc<dyn Notifier>>,
    offline_queue: Option<Arc<dyn OfflineQueue>>,
}

impl CacheService {
    pub fn new(config: ServiceConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let selector = Selector::new(&config.static_extensions, &config.api_prefixes)?;
        let executor =
            StrategyExecutor::new(db.clone(), fetcher, config.static_cache.clone(), config.dynamic_cache.clone());

        Ok(Self {
            config,
            db,
            selector,
            executor,
            lifecycle: RwLock::new(Lifecycle {
                state: WorkerState::Parsed,
                skip_waiting: false,
                clients_claimed: false,
            }),
            notifier: None,
            offline_queue: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_offline_queue(mut self, queue: Arc<dyn OfflineQueue>) -> Self {
        self.offline_queue = Some(queue);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.read().await.state
    }

    pub async fn skip_waiting(&self) -> bool {
        self.lifecycle.read().await.skip_waiting
    }

    pub async fn clients_claimed(&self) -> bool {
        self.lifecycle.read().await.clients_claimed
    }

    /// Build a GET request for a path or URL relative to the origin.
    pub fn request(&self, target: &str) -> Result<Request, Error> {
        let url = resolve(&self.config.origin, target).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Request::get(url))
    }

    /// Generation a strategy reads from and writes to.
    pub fn generation_for(&self, strategy: Strategy) -> Option<&str> {
        self.executor.generation_for(strategy)
    }

    /// Move to `next`, returning the state to restore if the step fails.
    async fn enter(&self, next: WorkerState) -> WorkerState {
        let mut lifecycle = self.lifecycle.write().await;
        std::mem::replace(&mut lifecycle.state, next)
    }

    /// Pre-cache the critical resources into the static generation.
    ///
    /// Individual resource failures are reported, not raised; only store
    /// errors fail the install, and leave the worker in its previous state.
    pub async fn handle_install(&self) -> Result<InstallReport, Error> {
        let previous = self.enter(WorkerState::Installing).await;

        let report = match self.precache().await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!("install failed: {err}");
                self.lifecycle.write().await.state = previous;
                return Err(err);
            }
        };

        let mut lifecycle = self.lifecycle.write().await;
        lifecycle.state = WorkerState::Installed;
        lifecycle.skip_waiting = true;

        Ok(report)
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let generation = self.config.static_cache.clone();
        self.db.open_generation(&generation).await?;

        let mut cached = Vec::new();
        let mut failed = Vec::new();

        for path in &self.config.critical_resources {
            let request = match self.request(path) {
                Ok(request) => request,
                Err(err) => {
                    failed.push(FailedResource { path: path.clone(), reason: err.to_string() });
                    continue;
                }
            };

            match self.executor.execute(Strategy::PassThrough, &request).await {
                Ok(response) if response.is_ok() => {
                    self.db.put_entry(&response.to_cached(&generation, &request)).await?;
                    cached.push(path.clone());
                }
                Ok(response) => failed.push(FailedResource {
                    path: path.clone(),
                    reason: format!("status {}", response.status.as_u16()),
                }),
                Err(err) => failed.push(FailedResource { path: path.clone(), reason: err.to_string() }),
            }
        }

        for failure in &failed {
            tracing::warn!(path = %failure.path, reason = %failure.reason, "critical resource not pre-cached");
        }
        tracing::info!(generation = %generation, cached = cached.len(), failed = failed.len(), "install complete");

        Ok(InstallReport { generation, cached, failed })
    }

    /// Delete every generation outside the allow-list and claim clients.
    ///
    /// A store error leaves the worker in its previous state; generations
    /// already deleted stay deleted.
    pub async fn handle_activate(&self) -> Result<ActivateReport, Error> {
        let previous = self.enter(WorkerState::Activating).await;

        let report = match self.evict_stale().await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!("activate failed: {err}");
                self.lifecycle.write().await.state = previous;
                return Err(err);
            }
        };

        let mut lifecycle = self.lifecycle.write().await;
        lifecycle.state = WorkerState::Activated;
        lifecycle.clients_claimed = true;

        Ok(report)
    }

    async fn evict_stale(&self) -> Result<ActivateReport, Error> {
        let allow_list = self.config.allow_list();
        let mut deleted = Vec::new();
        let mut retained = Vec::new();

        for name in self.db.generation_names().await? {
            if allow_list.contains(&name.as_str()) {
                retained.push(name);
            } else {
                self.db.delete_generation(&name).await?;
                tracing::info!(generation = %name, "deleted stale generation");
                deleted.push(name);
            }
        }

        Ok(ActivateReport { deleted, retained })
    }

    /// Interception point for every outgoing request.
    pub async fn handle_fetch(&self, request: Request) -> FetchDisposition {
        if !request.is_cacheable() {
            tracing::debug!("not intercepting {} {}", request.method, request.url);
            return FetchDisposition::Fallthrough(request);
        }

        let strategy = self.selector.select(&request);
        tracing::debug!(strategy = ?strategy, "handling {}", request.url);

        let response = match self.executor.execute(strategy, &request).await {
            Ok(response) => response,
            Err(err) => self.recover(&request, err).await,
        };

        FetchDisposition::Respond(response)
    }

    /// Plain network request for requests the service does not intercept.
    pub async fn pass_through(&self, request: &Request) -> Result<Response, Error> {
        self.executor.execute(Strategy::PassThrough, request).await
    }

    async fn recover(&self, request: &Request, err: Error) -> Response {
        match &err {
            Error::WorkerFault(_) | Error::Database(_) | Error::MigrationFailed(_) => {
                tracing::error!("worker fault handling {}: {err}", request.url)
            }
            _ => tracing::debug!("request for {} failed: {err}", request.url),
        }

        if request.is_navigation()
            && let Some(document) = self.cached_root_document().await
        {
            tracing::debug!("serving cached root document for {}", request.url);
            return document;
        }

        Response::synthetic_error(request.url.clone(), &err)
    }

    async fn cached_root_document(&self) -> Option<Response> {
        let root = self.config.origin.join("/").ok()?;
        let entry = self.db.match_any(&request_key("GET", root.as_str())).await.ok()??;
        Response::from_cached(entry).ok()
    }

    /// Parse a push payload and hand the notification to the notifier.
    pub async fn handle_push(&self, payload: &[u8]) -> Result<Notification, Error> {
        let icon = self.config.notification_icon.as_ref().map(|icon| {
            resolve(&self.config.origin, icon)
                .map(String::from)
                .unwrap_or_else(|_| icon.clone())
        });
        let notification = Notification::from_push(PushMessage::parse(payload), &self.config.app_name, icon);

        match &self.notifier {
            Some(notifier) => notifier.show(&notification).await?,
            None => tracing::debug!("no notifier registered; dropping '{}'", notification.title),
        }

        Ok(notification)
    }

    /// Focus or open the application root after a notification click.
    pub async fn handle_notification_click(&self, notification: &Notification) -> Result<Url, Error> {
        let root = self
            .config
            .origin
            .join("/")
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;

        tracing::debug!("notification '{}' clicked", notification.title);
        if let Some(notifier) = &self.notifier {
            notifier.open_or_focus(&root).await?;
        }

        Ok(root)
    }

    /// Handle a background sync event. Returns whether the tag was ours.
    pub async fn handle_sync(&self, tag: &str) -> Result<bool, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!("ignoring sync tag '{tag}'");
            return Ok(false);
        }

        match &self.offline_queue {
            Some(queue) => {
                let flushed = queue.flush().await?;
                tracing::info!(flushed, "flushed offline queue");
            }
            None => tracing::debug!("no offline queue registered for '{tag}'"),
        }

        Ok(true)
    }
}
