//! Unified error types for swcache.
//!
//! The first four variants form the caching taxonomy; the rest cover the
//! store, configuration input and URL handling around it.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the swcache service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetch rejected or produced no response (connectivity loss, DNS failure).
    #[error("NETWORK_FAILURE: {0}")]
    NetworkFailure(String),

    /// Request targets a disallowed local development URL shape.
    #[error("INVALID_REQUEST_GUARD: {0}")]
    InvalidRequestGuard(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Unexpected failure inside a strategy or background task.
    #[error("WORKER_FAULT: {0}")]
    WorkerFault(String),

    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Short stable code for the error kind.
    ///
    /// Used in the `x-swcache-error` header of synthetic responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NetworkFailure(_) => "network-failure",
            Error::InvalidRequestGuard(_) => "invalid-request-guard",
            Error::CacheMiss(_) => "cache-miss",
            Error::WorkerFault(_) => "worker-fault",
            Error::InvalidInput(_) => "invalid-input",
            Error::InvalidUrl(_) => "invalid-url",
            Error::Database(_) | Error::MigrationFailed(_) => "cache-error",
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::WorkerFault(format!("serialization failed: {err}"))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NetworkFailure(msg) => (-32000, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::InvalidRequestGuard(msg) => (-32004, msg.clone()),
            Error::WorkerFault(msg) => (-32005, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
