//! sw_fetch tool implementation.
//!
//! Routes a request through `CacheService::handle_fetch`. Requests the service
//! does not intercept are sent over the network untouched, as a host would.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{CacheService, ERROR_HEADER, FetchDisposition, Method, Response};
use swcache_core::Error;

use super::json_result;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL or path relative to the configured origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are cached.
    #[serde(default)]
    pub method: Option<String>,

    /// Optional Accept header.
    #[serde(default)]
    pub accept: Option<String>,

    /// Mark the request as a full-page navigation.
    #[serde(default)]
    pub navigate: bool,
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The final URL of the response.
    pub url: String,
    /// Whether the service intercepted the request.
    pub intercepted: bool,
    /// Strategy selected for intercepted requests.
    pub strategy: Option<String>,
    /// Generation the strategy reads from and writes to.
    pub generation: Option<String>,
    pub status: u16,
    /// "network", "cache" or "synthetic".
    pub source: String,
    pub content_type: Option<String>,
    /// Error kind carried by synthetic responses.
    pub error: Option<String>,
    pub body_bytes: usize,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

impl SwFetchOutput {
    fn new(response: &Response, intercepted: bool, strategy: Option<String>, generation: Option<String>) -> Self {
        Self {
            url: response.url.to_string(),
            intercepted,
            strategy,
            generation,
            status: response.status.as_u16(),
            source: response.source.as_str().to_string(),
            content_type: response.content_type().map(str::to_string),
            error: response
                .headers
                .get(ERROR_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body_bytes: response.body.len(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }
}

pub async fn fetch_impl(service: &CacheService, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let mut request = service.request(&params.url)?;

    if let Some(method) = params.method.as_deref() {
        request.method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {method}")))?;
    }
    if let Some(accept) = params.accept.as_deref() {
        request = request.with_accept(accept);
    }
    if params.navigate {
        request = request.navigate();
    }

    let strategy = request.is_cacheable().then(|| service.selector().select(&request));

    let output = match service.handle_fetch(request).await {
        FetchDisposition::Respond(response) => {
            let generation = strategy.and_then(|s| service.generation_for(s)).map(str::to_string);
            SwFetchOutput::new(&response, true, strategy.map(|s| s.as_str().to_string()), generation)
        }
        FetchDisposition::Fallthrough(request) => {
            let response = service.pass_through(&request).await?;
            SwFetchOutput::new(&response, false, None, None)
        }
    };

    json_result(&output)
}
