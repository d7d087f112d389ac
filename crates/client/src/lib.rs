//! Client side of swcache.
//!
//! This crate provides the request interception pipeline: the reqwest-backed
//! fetcher, strategy selection and execution over the generation store, the
//! install/activate/fetch lifecycle, and the standalone asset cache.

pub mod asset;
pub mod events;
pub mod fetch;
pub mod http;
pub mod service;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use asset::AssetCache;
pub use events::{Notification, Notifier, OfflineQueue, PushMessage};
pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use http::{ERROR_HEADER, Method, Request, RequestMode, Response, ResponseSource, StatusCode};
pub use service::{
    ActivateReport, CacheService, FailedResource, FetchDisposition, InstallReport, ServiceConfig, WorkerState,
};
pub use strategy::{RequestClass, Selector, Strategy, StrategyExecutor};
