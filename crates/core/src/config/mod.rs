//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin that root-relative paths resolve against.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version suffix of the generation names.
    ///
    /// Bumping it evicts the previous generations on the next activation.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Explicit static generation name (default: `static-<cache_version>`).
    #[serde(default)]
    pub static_cache_name: Option<String>,

    /// Explicit dynamic generation name (default: `dynamic-<cache_version>`).
    #[serde(default)]
    pub dynamic_cache_name: Option<String>,

    /// Paths pre-cached into the static generation at install.
    #[serde(default = "default_critical_resources")]
    pub critical_resources: Vec<String>,

    /// Path suffixes served cache-first.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// Path prefixes served network-first.
    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional HTTP request timeout in milliseconds.
    ///
    /// Unset means the HTTP client's own behaviour applies.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Directory holding files written by the asset cache.
    ///
    /// Set via SWCACHE_ASSET_DIR environment variable.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// Default notification title for push messages without one.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Icon attached to notifications.
    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    /// Background sync tag that triggers a flush of queued offline actions.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_critical_resources() -> Vec<String> {
    ["/", "/index.html", "/logos/logo.jpeg", "/logos/logo-192.png", "/logos/logo-512.png", "/favicon.ico"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_static_extensions() -> Vec<String> {
    [".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf", ".eot"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_prefixes() -> Vec<String> {
    ["/api/", "/supabase/", "/functions/"].into_iter().map(String::from).collect()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_redirects() -> usize {
    5
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("./swcache-assets")
}

fn default_app_name() -> String {
    "swcache".into()
}

fn default_notification_icon() -> String {
    "/logos/logo-192.png".into()
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            cache_version: default_cache_version(),
            static_cache_name: None,
            dynamic_cache_name: None,
            critical_resources: default_critical_resources(),
            static_extensions: default_static_extensions(),
            api_prefixes: default_api_prefixes(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            max_redirects: default_max_redirects(),
            asset_dir: default_asset_dir(),
            app_name: default_app_name(),
            notification_icon: default_notification_icon(),
            sync_tag: default_sync_tag(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Name of the static generation.
    pub fn static_cache_name(&self) -> String {
        self.static_cache_name
            .clone()
            .unwrap_or_else(|| format!("static-{}", self.cache_version))
    }

    /// Name of the dynamic generation.
    pub fn dynamic_cache_name(&self) -> String {
        self.dynamic_cache_name
            .clone()
            .unwrap_or_else(|| format!("dynamic-{}", self.cache_version))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
