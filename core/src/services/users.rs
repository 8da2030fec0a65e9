use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CreateUser, UpdateUser, User};

#[derive(Debug, Clone)]
pub struct UserService {
    resource: Collection,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: Collection::new(client, "/users"),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.list()
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Get, id)
    }

    pub fn build_create(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        self.resource.create(input)
    }

    pub fn build_update(&self, id: &str, input: &UpdateUser) -> Result<HttpRequest, ApiError> {
        self.resource.write(HttpMethod::Put, id, input)
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Delete, id)
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.resource.client().fetch(self.build_list()).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        self.resource.client().fetch(self.build_get(id)).await
    }

    pub async fn create(&self, input: &CreateUser) -> Result<User, ApiError> {
        let request = self.build_create(input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn update(&self, id: &str, input: &UpdateUser) -> Result<User, ApiError> {
        let request = self.build_update(id, input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.resource.client().fetch_empty(self.build_delete(id)).await
    }
}
