//! Domain DTOs for the clinic API.
//!
//! # Design
//! These records mirror the backend's JSON (camelCase) and are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift between the two. The client never owns these entities: whatever it
//! holds is a cache copy that the server may contradict at any time.
//!
//! Partial update payloads skip `None` fields when serialized so the server
//! leaves omitted fields untouched.

mod appointment;
mod dentist;
mod patient;
mod treatment;
mod user;

pub mod datetime;

pub use appointment::{
    Appointment, AppointmentStatus, CreateAppointment, DentistSummary, UpdateAppointmentStatus,
    UserSummary,
};
pub use dentist::{CreateDentist, Dentist, UpdateDentist};
pub use patient::{Address, CreatePatient, Patient, UpdatePatient};
pub use treatment::{CreateTreatment, Treatment, UpdateTreatment};
pub use user::{CreateUser, Credentials, LoginResponse, RegisterUser, UpdateUser, User, UserRole};
