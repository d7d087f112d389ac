//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - a generation name is empty, or both names are equal
    /// - a critical resource or API prefix does not start with `/`
    /// - a static extension does not start with `.`
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    /// - `user_agent` or `sync_tag` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") && origin.has_host() => {}
            Ok(_) => return Err(invalid("origin", "must be an http or https URL with a host")),
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        let static_name = self.static_cache_name();
        let dynamic_name = self.dynamic_cache_name();
        if static_name.trim().is_empty() {
            return Err(invalid("static_cache_name", "must not be empty"));
        }
        if dynamic_name.trim().is_empty() {
            return Err(invalid("dynamic_cache_name", "must not be empty"));
        }
        if static_name == dynamic_name {
            return Err(invalid("dynamic_cache_name", "must differ from the static generation name"));
        }

        if let Some(path) = self.critical_resources.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("critical_resources", format!("'{path}' must be root-relative")));
        }

        if let Some(ext) = self.static_extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
            return Err(invalid("static_extensions", format!("'{ext}' must look like '.ext'")));
        }

        if let Some(prefix) = self.api_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("api_prefixes", format!("'{prefix}' must start with '/'")));
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(invalid("timeout_ms", "must be at least 100ms"));
            }
            if timeout_ms > 300_000 {
                return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.sync_tag.is_empty() {
            return Err(invalid("sync_tag", "must not be empty"));
        }

        if self.critical_resources.is_empty() {
            tracing::warn!("critical_resources is empty; install will pre-cache nothing");
        }

        Ok(())
    }
}
