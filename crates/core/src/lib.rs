//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Cache generation store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, GenerationStats};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
