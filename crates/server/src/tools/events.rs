//! sw_push and sw_sync tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{CacheService, Notification};

use super::json_result;

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Raw push payload: a JSON object `{ "title", "body", "data" }` or plain text.
    #[serde(default)]
    pub payload: String,

    /// Also simulate a click on the resulting notification.
    #[serde(default)]
    pub click: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwPushOutput {
    pub notification: Notification,
    /// URL focused or opened by the click, if one was simulated.
    pub opened: Option<String>,
}

/// Parameters for the sw_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncOutput {
    pub tag: String,
    /// Whether the tag matched the configured sync tag.
    pub handled: bool,
}

pub async fn push_impl(service: &CacheService, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = service.handle_push(params.payload.as_bytes()).await?;

    let opened = if params.click {
        Some(service.handle_notification_click(&notification).await?.to_string())
    } else {
        None
    };

    json_result(&SwPushOutput { notification, opened })
}

pub async fn sync_impl(service: &CacheService, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let handled = service.handle_sync(&params.tag).await?;
    json_result(&SwSyncOutput { tag: params.tag, handled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ORIGIN, output, service};

    #[tokio::test]
    async fn test_push_with_click() {
        let service = service(Vec::new()).await;
        let params = SwPushParams { payload: r#"{"title":"Exam","body":"Starts at 9"}"#.into(), click: true };

        let result = push_impl(&service, params).await.unwrap();
        let out: SwPushOutput = output(&result);

        assert_eq!(out.notification.title, "Exam");
        assert_eq!(out.notification.body, "Starts at 9");
        assert_eq!(out.opened, Some(format!("{ORIGIN}/")));
    }

    #[tokio::test]
    async fn test_push_plain_text_defaults_title() {
        let service = service(Vec::new()).await;
        let params = SwPushParams { payload: "hello".into(), click: false };

        let result = push_impl(&service, params).await.unwrap();
        let out: SwPushOutput = output(&result);

        assert_eq!(out.notification.title, "swcache");
        assert_eq!(out.notification.body, "hello");
        assert_eq!(out.opened, None);
    }

    #[tokio::test]
    async fn test_sync_tags() {
        let service = service(Vec::new()).await;

        let result = sync_impl(&service, SwSyncParams { tag: "background-sync".into() }).await.unwrap();
        assert!(output::<SwSyncOutput>(&result).handled);

        let result = sync_impl(&service, SwSyncParams { tag: "other".into() }).await.unwrap();
        assert!(!output::<SwSyncOutput>(&result).handled);
    }
}
