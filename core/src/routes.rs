//! Console routes and the navigation seam.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::types::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    SignIn,
    Agenda,
    Patients,
    PatientDetail(String),
    Dentists,
    NotFound,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SignIn => "/signin".to_string(),
            Route::Agenda => "/agenda".to_string(),
            Route::Patients => "/patients".to_string(),
            Route::PatientDetail(id) => format!("/patients/{id}"),
            Route::Dentists => "/dentists".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Inverse of `path`. Unknown paths resolve to `NotFound`.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/signin" => Route::SignIn,
            "/agenda" => Route::Agenda,
            "/patients" => Route::Patients,
            "/dentists" => Route::Dentists,
            _ => match trimmed.strip_prefix("/patients/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::PatientDetail(id.to_string()),
                _ => Route::NotFound,
            },
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::SignIn | Route::NotFound)
    }

    /// Role needed beyond being signed in, if any.
    pub fn required_role(&self) -> Option<UserRole> {
        match self {
            Route::Dentists => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Whatever moves the user between screens.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator for headless hosts: remembers every navigation in order.
#[derive(Debug, Default)]
pub struct RouteHistory {
    visited: Mutex<Vec<Route>>,
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn visited(&self) -> Vec<Route> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RouteHistory {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
