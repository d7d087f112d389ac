//! Push and background sync boundaries.
//!
//! The service only parses and routes these events. Showing notifications,
//! focusing windows and replaying queued offline actions belong to the host,
//! which plugs in through [`Notifier`] and [`OfflineQueue`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use swcache_core::Error;
use url::Url;

/// Body of a push message: `{ "title", "body", "data" }`, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl PushMessage {
    /// Parse a push payload.
    ///
    /// Payloads that are not a JSON object are treated as a plain-text body.
    pub fn parse(payload: &[u8]) -> Self {
        if payload.is_empty() {
            return Self::default();
        }

        match serde_json::from_slice::<Self>(payload) {
            Ok(message) => message,
            Err(_) => Self { body: Some(String::from_utf8_lossy(payload).into_owned()), ..Self::default() },
        }
    }
}

/// A notification ready to be displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub data: Value,
}

impl Notification {
    pub fn from_push(message: PushMessage, default_title: &str, icon: Option<String>) -> Self {
        Self {
            title: message.title.unwrap_or_else(|| default_title.to_string()),
            body: message.body.unwrap_or_default(),
            icon,
            data: message.data,
        }
    }
}

/// Displays notifications and brings the application to the foreground.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    /// Focus an open window on `url`, or open a new one.
    async fn open_or_focus(&self, url: &Url) -> Result<(), Error>;
}

/// Replays actions queued while offline.
#[async_trait::async_trait]
pub trait OfflineQueue: Send + Sync {
    /// Returns the number of actions flushed.
    async fn flush(&self) -> Result<usize, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_message() {
        let message = PushMessage::parse(br#"{"title":"Exam tomorrow","body":"Revise chapter 3","data":{"id":7}}"#);
        assert_eq!(message.title.as_deref(), Some("Exam tomorrow"));
        assert_eq!(message.body.as_deref(), Some("Revise chapter 3"));
        assert_eq!(message.data["id"], 7);
    }

    #[test]
    fn test_parse_partial_message() {
        let message = PushMessage::parse(br#"{"body":"Hello"}"#);
        assert_eq!(message.title, None);
        assert_eq!(message.data, Value::Null);
    }

    #[test]
    fn test_parse_plain_text() {
        let message = PushMessage::parse(b"New results are available");
        assert_eq!(message.body.as_deref(), Some("New results are available"));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PushMessage::parse(b""), PushMessage::default());
    }

    #[test]
    fn test_notification_defaults_title() {
        let notification = Notification::from_push(PushMessage::parse(br#"{"body":"Hi"}"#), "swcache", None);
        assert_eq!(notification.title, "swcache");
        assert_eq!(notification.body, "Hi");
    }
}
