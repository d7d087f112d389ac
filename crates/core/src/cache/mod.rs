//! SQLite-backed store for cache generations.
//!
//! This module provides the persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Named generations that are created lazily and deleted wholesale
//! - Entries keyed by request identity (`GET <url>`), last write wins
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedResponse;
pub use generations::GenerationStats;
