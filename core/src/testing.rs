//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Answers every request from a routing closure and records what was sent.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(move |req| Ok(handler(req))),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request fails with 500.
    pub(crate) fn empty() -> Arc<Self> {
        Self::new(|_| status_response(500, ""))
    }

    /// Every request fails before a response arrives.
    pub(crate) fn offline() -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(|_| Err(TransportError::Connect("connection refused".to_string()))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of requests whose method and full URL match exactly.
    pub(crate) fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url() == url)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = (self.handler)(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        result
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}

pub(crate) fn status_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}
