//! Client asset cache.
//!
//! Memoises remote assets (typically images) as local files so UI code can
//! reuse them across renders. Independent of the cache generations: nothing
//! here touches the SQLite store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use swcache_core::Error;
use swcache_core::cache::hash::content_key;
use tokio::sync::RwLock;
use url::Url;

use crate::fetch::{Fetcher, canonicalize};
use crate::http::Request;

/// Longest extension kept on cached file names.
const MAX_EXTENSION_LEN: usize = 5;

/// Best-effort local copies of remote assets.
pub struct AssetCache {
    fetcher: Arc<dyn Fetcher>,
    dir: PathBuf,
    resolved: RwLock<HashMap<String, PathBuf>>,
    writes: AtomicU64,
}

impl AssetCache {
    pub fn new(fetcher: Arc<dyn Fetcher>, dir: impl Into<PathBuf>) -> Self {
        Self { fetcher, dir: dir.into(), resolved: RwLock::new(HashMap::new()), writes: AtomicU64::new(0) }
    }

    /// Return a usable URL for `src`.
    ///
    /// A `file://` URL of the local copy when caching succeeds, `src`
    /// unchanged otherwise.
    pub async fn resolve(&self, src: &str) -> String {
        match self.try_resolve(src).await {
            Ok(local) => local,
            Err(err) => {
                tracing::debug!("asset cache falling back to {src}: {err}");
                src.to_string()
            }
        }
    }

    async fn try_resolve(&self, src: &str) -> Result<String, Error> {
        let known = self.resolved.read().await.get(src).cloned();
        if let Some(path) = known {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return file_url(&path);
            }
            self.resolved.write().await.remove(src);
        }

        let url = canonicalize(src).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let response = self.fetcher.fetch(&Request::get(url.clone())).await?;
        if !response.is_ok() {
            return Err(Error::NetworkFailure(format!("{url} returned status {}", response.status.as_u16())));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::WorkerFault(format!("creating {}: {e}", self.dir.display())))?;

        let name = file_name(&url);
        let path = self.dir.join(&name);
        self.write_atomic(&name, &path, &response.body).await?;

        let local = file_url(&path)?;
        self.resolved.write().await.insert(src.to_string(), path);
        Ok(local)
    }

    /// Write to a private temporary name, then rename over `path` so readers
    /// never observe a partially written file.
    async fn write_atomic(&self, name: &str, path: &Path, body: &[u8]) -> Result<(), Error> {
        let n = self.writes.fetch_add(1, Ordering::Relaxed);
        let temp_path = self.dir.join(format!(".{name}.{}-{n}.tmp", std::process::id()));

        if let Err(e) = tokio::fs::write(&temp_path, body).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::WorkerFault(format!("writing {}: {e}", temp_path.display())));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::WorkerFault(format!("renaming into {}: {e}", path.display())));
        }

        Ok(())
    }

    /// Drop the memoised entry for `src`. The file stays on disk.
    pub async fn forget(&self, src: &str) -> bool {
        self.resolved.write().await.remove(src).is_some()
    }

    pub async fn clear(&self) {
        self.resolved.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.resolved.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resolved.read().await.is_empty()
    }
}

/// `<sha256(url)>[.<ext>]`, keeping short alphanumeric extensions.
fn file_name(url: &Url) -> String {
    let key = content_key(url.as_str());
    let extension = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{key}.{ext}"),
        None => key,
    }
}

fn file_url(path: &Path) -> Result<String, Error> {
    let absolute = std::path::absolute(path).map_err(|e| Error::WorkerFault(format!("{}: {e}", path.display())))?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| Error::InvalidUrl(format!("not a file path: {}", absolute.display())))
}
