//! One thin service per backend resource.
//!
//! # Design
//! Every operation comes in two halves. `build_*` returns the `HttpRequest`
//! (pure, inspectable in tests, executable by any host), and the async method
//! of the same name sends it through `ApiClient` and parses the typed result.
//! Services never catch errors: the normalized `ApiError` passes through
//! unchanged.
//!
//! Filters (`date`, `dentistId`, `userId`, `active`) are always sent to the
//! server as query parameters.

mod appointments;
mod auth;
mod dentists;
mod patients;
mod treatments;
mod users;

pub use appointments::AppointmentService;
pub use auth::AuthService;
pub use dentists::DentistService;
pub use patients::PatientService;
pub use treatments::TreatmentService;
pub use users::UserService;

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{encode_component, HttpMethod, HttpRequest};

/// Request builders shared by the CRUD-shaped resources.
#[derive(Debug, Clone)]
pub(crate) struct Collection {
    client: ApiClient,
    path: &'static str,
}

impl Collection {
    pub(crate) fn new(client: ApiClient, path: &'static str) -> Self {
        Self { client, path }
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    pub(crate) fn list(&self) -> HttpRequest {
        self.client.request(HttpMethod::Get, self.path)
    }

    pub(crate) fn member(&self, method: HttpMethod, id: &str) -> HttpRequest {
        self.client.request(method, &self.member_path(id))
    }

    pub(crate) fn create<B: Serialize>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, self.path, body)
    }

    pub(crate) fn write<B: Serialize>(
        &self,
        method: HttpMethod,
        id: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.client.json_request(method, &self.member_path(id), body)
    }

    /// Write to a fixed subresource of a member, e.g. `{id}/status`.
    pub(crate) fn write_subresource<B: Serialize>(
        &self,
        method: HttpMethod,
        id: &str,
        subresource: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/{subresource}", self.member_path(id));
        self.client.json_request(method, &path, body)
    }

    /// Ids are escaped so each one stays a single path segment.
    pub(crate) fn member_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, encode_component(id))
    }
}
