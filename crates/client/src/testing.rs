//! Scripted `Fetcher` used by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use swcache_core::Error;
use tokio::sync::Notify;

use crate::fetch::Fetcher;
use crate::http::{Request, Response, ResponseSource};

#[derive(Clone)]
enum Route {
    Respond { status: u16, body: Vec<u8> },
    Fail(String),
}

/// Answers requests from a URL → response table and counts calls.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every fetch waits for one `notify_one` on the gate before answering.
    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::default() }
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond { status, body: body.to_vec() });
    }

    pub(crate) fn fail(&self, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Fail("connection refused".to_string()));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        match route {
            Some(Route::Respond { status, body }) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
                Ok(Response {
                    url: request.url.clone(),
                    status: StatusCode::from_u16(status).unwrap(),
                    headers,
                    body: Bytes::from(body),
                    source: ResponseSource::Network,
                })
            }
            Some(Route::Fail(reason)) => Err(Error::NetworkFailure(reason)),
            None => Err(Error::NetworkFailure(format!("no route for {}", request.url))),
        }
    }
}

/// Panics on every call.
pub(crate) struct PanickingFetcher;

#[async_trait::async_trait]
impl Fetcher for PanickingFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        panic!("fetcher crashed on {}", request.url);
    }
}
