//! Single point of outbound request configuration and error normalization.
//!
//! # Design
//! `ApiClient` carries no per-call state. It knows the base URL, where the
//! bearer token lives, how to execute a request, and whom to tell about a
//! 401. Building a request and parsing a response stay separate steps
//! (`request`/`json_request` then `parse_json`/`parse_empty`), so services can
//! expose pure `build_*` methods and any host can do the I/O itself.
//!
//! The 401 side effects (dropping the stored session, sending the user back
//! to sign-in) are not performed here. They go through the injected
//! `UnauthorizedHandler`, which keeps this module free of storage and
//! navigation concerns.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::storage::{self, SessionStorage};
use crate::transport::Transport;

/// Reacts to a 401 from any request. Runs before the error is returned to
/// the caller.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn SessionStorage>,
    unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_unauthorized_handler", &self.unauthorized.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            storage,
            unauthorized: None,
        }
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized = Some(handler);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    /// Build a bodiless request for `path` (relative to the base URL).
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = storage::load_token(self.storage.as_ref()) {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    pub fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(ApiError::serialization)?;
        let mut request = self.request(method, path);
        request.body = Some(body);
        Ok(request)
    }

    /// Execute `request` and return the response only if it is 2xx.
    ///
    /// No retries: a failure is surfaced to the caller exactly once.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url();
        tracing::debug!(method = method.as_str(), %url, "sending request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(method = method.as_str(), %url, %err, "request got no response");
                return Err(err.into());
            }
        };

        if response.is_success() {
            return Ok(response);
        }

        let err = ApiError::from_status(response.status, &response.body);
        tracing::warn!(
            method = method.as_str(),
            %url,
            status = err.status_code,
            message = %err.message,
            "request failed"
        );
        if err.is_unauthorized() {
            if let Some(handler) = &self.unauthorized {
                handler.on_unauthorized();
            }
        }
        Err(err)
    }

    pub async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        parse_json(self.send(request).await?)
    }

    pub async fn fetch_empty(&self, request: HttpRequest) -> Result<(), ApiError> {
        parse_empty(self.send(request).await?)
    }
}

/// Map non-success status codes to the normalized error.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(ApiError::deserialization)
}

/// Accept any 2xx and ignore the body (204 or an echo of the deleted row).
pub fn parse_empty(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}
