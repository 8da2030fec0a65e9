use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CreateDentist, Dentist, UpdateDentist};

#[derive(Debug, Clone)]
pub struct DentistService {
    resource: Collection,
}

impl DentistService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: Collection::new(client, "/dentists"),
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

    pub fn build_create(&self, input: &CreateDentist) -> Result<HttpRequest, ApiError> {
        self.resource.create(input)
    }

    pub fn build_update(&self, id: &str, input: &UpdateDentist) -> Result<HttpRequest, ApiError> {
        self.resource.write(HttpMethod::Put, id, input)
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Delete, id)
    }

    pub async fn list(&self) -> Result<Vec<Dentist>, ApiError> {
        self.resource.client().fetch(self.build_list()).await
    }

    pub async fn list_active(&self) -> Result<Vec<Dentist>, ApiError> {
        self.resource.client().fetch(self.build_list_active()).await
    }

    pub async fn get(&self, id: &str) -> Result<Dentist, ApiError> {
        self.resource.client().fetch(self.build_get(id)).await
    }

    pub async fn create(&self, input: &CreateDentist) -> Result<Dentist, ApiError> {
        let request = self.build_create(input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn update(&self, id: &str, input: &UpdateDentist) -> Result<Dentist, ApiError> {
        let request = self.build_update(id, input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.resource.client().fetch_empty(self.build_delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::ScriptedTransport;
    use std::sync::Arc;

    fn service() -> DentistService {
        DentistService::new(ApiClient::new(
            "http://localhost:5000",
            ScriptedTransport::empty(),
            Arc::new(MemoryStorage::new()),
        ))
    }

    #[test]
    fn active_filter_is_server_side() {
        assert_eq!(
            service().build_list_active().url(),
            "http://localhost:5000/dentists?active=true"
        );
    }

    #[test]
    fn update_is_put_with_partial_body() {
        let req = service()
            .build_update(
                "d1",
                &UpdateDentist {
                    specialty: Some("Periodontia".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:5000/dentists/d1");
        assert_eq!(req.body.as_deref(), Some(r#"{"specialty":"Periodontia"}"#));
    }
}
