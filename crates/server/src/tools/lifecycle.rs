//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};
use swcache_client::{ActivateReport, CacheService, InstallReport, WorkerState};

use super::json_result;

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwInstallOutput {
    #[serde(flatten)]
    pub report: InstallReport,
    /// Lifecycle state after the step.
    pub state: WorkerState,
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwActivateOutput {
    #[serde(flatten)]
    pub report: ActivateReport,
    pub state: WorkerState,
    pub clients_claimed: bool,
}

pub async fn install_impl(service: &CacheService) -> Result<CallToolResult, McpError> {
    let report = service.handle_install().await?;
    json_result(&SwInstallOutput { report, state: service.state().await })
}

pub async fn activate_impl(service: &CacheService) -> Result<CallToolResult, McpError> {
    let report = service.handle_activate().await?;
    json_result(&SwActivateOutput {
        report,
        state: service.state().await,
        clients_claimed: service.clients_claimed().await,
    })
}
