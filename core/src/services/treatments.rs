use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CreateTreatment, Treatment, UpdateTreatment};

#[derive(Debug, Clone)]
pub struct TreatmentService {
    resource: Collection,
}

impl TreatmentService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: Collection::new(client, "/treatments"),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.list()
    }

    pub fn build_list_active(&self) -> HttpRequest {
        self.resource.list().with_query("active", "true")
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Get, id)
    }

    pub fn build_create(&self, input: &CreateTreatment) -> Result<HttpRequest, ApiError> {
        self.resource.create(input)
    }

    pub fn build_update(&self, id: &str, input: &UpdateTreatment) -> Result<HttpRequest, ApiError> {
        self.resource.write(HttpMethod::Put, id, input)
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Delete, id)
    }

    pub async fn list(&self) -> Result<Vec<Treatment>, ApiError> {
        self.resource.client().fetch(self.build_list()).await
    }

    pub async fn list_active(&self) -> Result<Vec<Treatment>, ApiError> {
        self.resource.client().fetch(self.build_list_active()).await
    }

    pub async fn get(&self, id: &str) -> Result<Treatment, ApiError> {
        self.resource.client().fetch(self.build_get(id)).await
    }

    pub async fn create(&self, input: &CreateTreatment) -> Result<Treatment, ApiError> {
        let request = self.build_create(input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn update(&self, id: &str, input: &UpdateTreatment) -> Result<Treatment, ApiError> {
        let request = self.build_update(id, input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.resource.client().fetch_empty(self.build_delete(id)).await
    }
}
