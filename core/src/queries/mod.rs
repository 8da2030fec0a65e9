//! Cached reads and cache-aware writes for every backend resource.
//!
//! # Design
//! One handle per resource bundles the shared `QueryCache`, the resource's
//! service and the `Notifier`. Reads go through the cache with the windows
//! each view needs. Writes wait for the server, then invalidate or update
//! the affected keys and toast the outcome. Nothing is written to the cache
//! before the server confirms it.
//!
//! A read whose id or filter is empty is disabled: it returns an idle result
//! and sends nothing.

mod appointments;
mod dentists;
mod patients;
mod treatments;
mod users;

pub use appointments::{keys as appointment_keys, AppointmentQueries, PollHandle};
pub use dentists::{keys as dentist_keys, DentistQueries};
pub use patients::{keys as patient_keys, PatientQueries};
pub use treatments::{keys as treatment_keys, TreatmentQueries};
pub use users::{keys as user_keys, UserQueries};

use std::time::Duration;

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
