use chrono::NaiveDate;

use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{Appointment, AppointmentStatus, CreateAppointment, UpdateAppointmentStatus};

#[derive(Debug, Clone)]
pub struct AppointmentService {
    resource: Collection,
}

impl AppointmentService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: Collection::new(client, "/appointments"),
        }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.list()
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Get, id)
    }

    pub fn build_create(&self, input: &CreateAppointment) -> Result<HttpRequest, ApiError> {
        self.resource.create(input)
    }

    pub fn build_update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<HttpRequest, ApiError> {
        self.resource.write_subresource(
            HttpMethod::Patch,
            id,
            "status",
            &UpdateAppointmentStatus { status },
        )
    }

    pub fn build_cancel(&self, id: &str) -> HttpRequest {
        self.resource.member(HttpMethod::Delete, id)
    }

    pub fn build_list_by_date(&self, date: NaiveDate) -> HttpRequest {
        self.resource
            .list()
            .with_query("date", date.format("%Y-%m-%d").to_string())
    }

    pub fn build_list_by_dentist(&self, dentist_id: &str) -> HttpRequest {
        self.resource.list().with_query("dentistId", dentist_id)
    }

    pub fn build_list_by_user(&self, user_id: &str) -> HttpRequest {
        self.resource.list().with_query("userId", user_id)
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, ApiError> {
        self.resource.client().fetch(self.build_list()).await
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, ApiError> {
        self.resource.client().fetch(self.build_get(id)).await
    }

    pub async fn create(&self, input: &CreateAppointment) -> Result<Appointment, ApiError> {
        let request = self.build_create(input)?;
        self.resource.client().fetch(request).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError> {
        let request = self.build_update_status(id, status)?;
        self.resource.client().fetch(request).await
    }

    pub async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.resource.client().fetch_empty(self.build_cancel(id)).await
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError> {
        self.resource.client().fetch(self.build_list_by_date(date)).await
    }

    pub async fn list_by_dentist(&self, dentist_id: &str) -> Result<Vec<Appointment>, ApiError> {
        self.resource
            .client()
            .fetch(self.build_list_by_dentist(dentist_id))
            .await
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Appointment>, ApiError> {
        self.resource.client().fetch(self.build_list_by_user(user_id)).await
    }
}
