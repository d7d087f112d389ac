//! Host-side collaborators for the push and sync boundaries.
//!
//! A stdio server has no windows and no offline queue, so both simply log.

use swcache_client::{Notification, Notifier, OfflineQueue};
use swcache_core::Error;
use url::Url;

pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }

    async fn open_or_focus(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(url = %url, "open or focus client");
        Ok(())
    }
}

pub struct LogOfflineQueue;

#[async_trait::async_trait]
impl OfflineQueue for LogOfflineQueue {
    async fn flush(&self) -> Result<usize, Error> {
        tracing::info!("background sync requested; no queued actions");
        Ok(0)
    }
}
