//! cache_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::CacheService;
use swcache_core::{Error, GenerationStats};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// List the keys of this generation instead of the generations themselves.
    #[serde(default)]
    pub generation: Option<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheListOutput {
    Generations { generations: Vec<GenerationStats> },
    Keys { generation: String, keys: Vec<String> },
}

/// Implementation of the cache_list tool.
pub async fn list_impl(service: &CacheService, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let db = service.db();

    let output = match params.generation {
        None => CacheListOutput::Generations { generations: db.generation_stats().await? },
        Some(generation) => {
            if !db.has_generation(&generation).await? {
                return Err(Error::CacheMiss(format!("no generation named {generation}")).into());
            }
            let keys = db.entry_keys(&generation).await?;
            CacheListOutput::Keys { generation, keys }
        }
    };

    json_result(&output)
}
