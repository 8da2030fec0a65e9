use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CreatePatient, Patient, UpdatePatient};

#[derive(Debug, Clone)]
pub struct PatientService {
    resource: Collection,
}

impl PatientService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: Collection::new(client, "/patients"),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.list()
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Get, id)
    }

    pub fn build_create(&self, input: &CreatePatient) -> Result<HttpRequest, ApiError> {
        self.resource.create(input)
    }

    pub fn build_update(&self, id: &str, input: &UpdatePatient) -> Result<HttpRequest, ApiError> {
        self.resource.write(HttpMethod::Put, id, input)
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Delete, id)
    }

    pub async fn list(&self) -> Result<Vec<Patient>, ApiError> {
        self.resource.client().fetch(self.build_list()).await
    }

    pub async fn get(&self, id: &str) -> Result<Patient, ApiError> {
        self.resource.client().fetch(self.build_get(id)).await
    }

    pub async fn create(&self, input: &CreatePatient) -> Result<Patient, ApiError> {
        let request = self.build_create(input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn update(&self, id: &str, input: &UpdatePatient) -> Result<Patient, ApiError> {
        let request = self.build_update(id, input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.resource.client().fetch_empty(self.build_delete(id)).await
    }
}
