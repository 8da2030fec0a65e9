//! Wire types of the clinic API, as the backend stores and returns them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Common,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DentistSummary {
    pub id: String,
    pub name: String,
    pub specialty: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub dentist_id: String,
    pub scheduled_date: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: String,
    pub treatment_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dentist: Option<DentistSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dentist {
    pub id: String,
    pub name: String,
    pub crm: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration: u32,
    pub price: f64,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- requests ---

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub user_id: String,
    pub dentist_id: String,
    pub scheduled_date: NaiveDateTime,
    pub treatment_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: AppointmentStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub dentist_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActiveFilter {
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDentist {
    pub name: String,
    pub crm: String,
    pub specialty: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDentist {
    pub name: Option<String>,
    pub crm: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u32,
    pub price: f64,
    pub category: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreatment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatient {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_serializes_camel_case() {
        let now = Utc::now();
        let appointment = Appointment {
            id: "a1".to_string(),
            user_id: "u1".to_string(),
            dentist_id: "d1".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 8, 26)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            status: AppointmentStatus::InProgress,
            notes: String::new(),
            treatment_type: "limpeza".to_string(),
            created_at: now,
            updated_at: now,
            user: None,
            dentist: None,
        };
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["scheduledDate"], "2024-08-26T09:00:00");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert!(json.get("user").is_none());
    }

    #[test]
    fn create_appointment_requires_dentist() {
        let result: Result<CreateAppointment, _> = serde_json::from_str(
            r#"{"userId":"u1","scheduledDate":"2024-08-26T09:00:00","treatmentType":"limpeza"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn filter_fields_are_camel_case() {
        let filter: AppointmentFilter =
            serde_json::from_str(r#"{"dentistId":"d1","date":"2024-08-26"}"#).unwrap();
        assert_eq!(filter.dentist_id.as_deref(), Some("d1"));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 8, 26));
    }

    #[test]
    fn updates_accept_empty_objects() {
        let input: UpdateDentist = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none() && input.is_active.is_none());
    }
}
