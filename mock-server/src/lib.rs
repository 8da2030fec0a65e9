//! In-memory stand-in for the clinic REST API.
//!
//! Every route except login and register requires a bearer token issued by
//! `/auth/login`. Errors are JSON `{ "message", "statusCode" }` bodies.

pub mod models;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use models::*;

pub const ADMIN_ID: &str = "u1";
pub const ADMIN_EMAIL: &str = "admin@odonto.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const DENTIST_ID: &str = "d1";
pub const TREATMENT_ID: &str = "t1";

struct Account {
    user: User,
    password: Option<String>,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    appointments: HashMap<String, Appointment>,
    dentists: HashMap<String, Dentist>,
    treatments: HashMap<String, Treatment>,
    patients: HashMap<String, Patient>,
}

impl Store {
    fn seeded() -> Self {
        let now = Utc::now();
        let mut store = Store::default();
        store.accounts.insert(
            ADMIN_ID.to_string(),
            Account {
                user: User {
                    id: ADMIN_ID.to_string(),
                    name: "Administrador".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    phone: "11900000000".to_string(),
                    cpf: "000.000.000-00".to_string(),
                    birth_date: None,
                    role: Role::Admin,
                },
                password: Some(ADMIN_PASSWORD.to_string()),
            },
        );
        store.dentists.insert(
            DENTIST_ID.to_string(),
            Dentist {
                id: DENTIST_ID.to_string(),
                name: "Dra. Ana Souza".to_string(),
                crm: "12345-SP".to_string(),
                specialty: "Clínico Geral".to_string(),
                phone: "11911112222".to_string(),
                email: "ana@odonto.com".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );
        store.treatments.insert(
            TREATMENT_ID.to_string(),
            Treatment {
                id: TREATMENT_ID.to_string(),
                name: "Limpeza".to_string(),
                description: "Profilaxia e remoção de tártaro".to_string(),
                duration: 30,
                price: 150.0,
                category: "Preventivo".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );
        store
    }

    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.accounts
            .values()
            .any(|a| a.user.email.eq_ignore_ascii_case(email) && Some(a.user.id.as_str()) != except)
    }

    /// Appointment with its user and dentist summaries attached.
    fn present(&self, appointment: &Appointment) -> Appointment {
        let mut out = appointment.clone();
        out.user = self.accounts.get(&appointment.user_id).map(|a| UserSummary {
            id: a.user.id.clone(),
            name: a.user.name.clone(),
            email: a.user.email.clone(),
            phone: a.user.phone.clone(),
        });
        out.dentist = self.dentists.get(&appointment.dentist_id).map(|d| DentistSummary {
            id: d.id.clone(),
            name: d.name.clone(),
            specialty: d.specialty.clone(),
        });
        out
    }
}

/// Shared backend state. Cloning shares the same store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Store with the admin account, one dentist and one treatment.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::seeded())),
        }
    }

    /// Invalidate every issued token, so the next authenticated call gets 401.
    pub async fn revoke_tokens(&self) {
        self.store.write().await.tokens.clear();
    }

    pub async fn appointment_count(&self) -> usize {
        self.store.read().await.appointments.len()
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Token inválido ou expirado")
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} não encontrado"))
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": self.message,
            "statusCode": self.status.as_u16(),
        }));
        (self.status, body).into_response()
    }
}

type ApiResult<T> = Result<T, AppError>;

/// Id of the account behind the request's bearer token.
#[derive(Clone, Debug)]
struct CurrentUser(String);

pub fn app() -> Router {
    app_with_state(AppState::new())
}

pub fn app_with_state(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/profile", get(profile))
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/{id}", get(get_appointment).delete(cancel_appointment))
        .route("/appointments/{id}/status", patch(update_appointment_status))
        .route("/dentists", get(list_dentists).post(create_dentist))
        .route("/dentists/{id}", get(get_dentist).put(update_dentist).delete(delete_dentist))
        .route("/treatments", get(list_treatments).post(create_treatment))
        .route(
            "/treatments/{id}",
            get(get_treatment).put(update_treatment).delete(delete_treatment),
        )
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/{id}", get(get_patient).put(update_patient).delete(delete_patient))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::new()).await
}

/// Serve over `listener` with a caller-held `state`.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(AppError::unauthorized)?;
    let user_id = state
        .store
        .read()
        .await
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(AppError::unauthorized)?;
    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

fn required(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid(format!("Campo obrigatório: {field}")));
    }
    Ok(())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// --- auth ---

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> ApiResult<Json<LoginResponse>> {
    let mut store = state.store.write().await;
    let user = store
        .accounts
        .values()
        .find(|a| {
            a.user.email.eq_ignore_ascii_case(&input.email)
                && a.password.as_deref() == Some(input.password.as_str())
        })
        .map(|a| a.user.clone())
        .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "Credenciais inválidas"))?;
    let token = new_id();
    store.tokens.insert(token.clone(), user.id.clone());
    tracing::info!(user = %user.email, "login");
    Ok(Json(LoginResponse {
        access_token: token,
        user,
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    required("name", &input.name)?;
    required("email", &input.email)?;
    required("password", &input.password)?;
    let mut store = state.store.write().await;
    if store.email_taken(&input.email, None) {
        return Err(AppError::new(StatusCode::CONFLICT, "E-mail já cadastrado"));
    }
    let user = User {
        id: new_id(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        cpf: input.cpf,
        birth_date: input.birth_date,
        role: Role::Common,
    };
    store.accounts.insert(
        user.id.clone(),
        Account {
            user: user.clone(),
            password: Some(input.password),
        },
    );
    Ok((StatusCode::CREATED, Json(user)))
}

async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(id)): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    let store = state.store.read().await;
    store
        .accounts
        .get(&id)
        .map(|a| Json(a.user.clone()))
        .ok_or_else(AppError::unauthorized)
}

// --- appointments ---

async fn list_appointments(
    State(state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Json<Vec<Appointment>> {
    let store = state.store.read().await;
    let mut rows: Vec<Appointment> = store
        .appointments
        .values()
        .filter(|a| filter.date.map_or(true, |d| a.scheduled_date.date() == d))
        .filter(|a| filter.dentist_id.as_ref().map_or(true, |id| &a.dentist_id == id))
        .filter(|a| filter.user_id.as_ref().map_or(true, |id| &a.user_id == id))
        .map(|a| store.present(a))
        .collect();
    rows.sort_by_key(|a| a.scheduled_date);
    Json(rows)
}

async fn create_appointment(
    State(state): State<AppState>,
    Json(input): Json<CreateAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    required("treatmentType", &input.treatment_type)?;
    let mut store = state.store.write().await;
    if !store.accounts.contains_key(&input.user_id) {
        return Err(AppError::invalid("Paciente não encontrado"));
    }
    if !store.dentists.contains_key(&input.dentist_id) {
        return Err(AppError::invalid("Dentista não encontrado"));
    }
    let now = Utc::now();
    let appointment = Appointment {
        id: new_id(),
        user_id: input.user_id,
        dentist_id: input.dentist_id,
        scheduled_date: input.scheduled_date,
        status: AppointmentStatus::Scheduled,
        notes: input.notes.unwrap_or_default(),
        treatment_type: input.treatment_type,
        created_at: now,
        updated_at: now,
        user: None,
        dentist: None,
    };
    store
        .appointments
        .insert(appointment.id.clone(), appointment.clone());
    tracing::info!(id = %appointment.id, "appointment created");
    Ok((StatusCode::CREATED, Json(store.present(&appointment))))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let store = state.store.read().await;
    store
        .appointments
        .get(&id)
        .map(|a| Json(store.present(a)))
        .ok_or_else(|| AppError::not_found("Agendamento"))
}

async fn update_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StatusInput>,
) -> ApiResult<Json<Appointment>> {
    let mut store = state.store.write().await;
    let appointment = store
        .appointments
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Agendamento"))?;
    appointment.status = input.status;
    appointment.updated_at = Utc::now();
    let appointment = appointment.clone();
    Ok(Json(store.present(&appointment)))
}

/// Cancelling keeps the record with status `CANCELLED`.
async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let appointment = store
        .appointments
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Agendamento"))?;
    appointment.status = AppointmentStatus::Cancelled;
    appointment.updated_at = Utc::now();
    Ok(StatusCode::NO_CONTENT)
}

// --- dentists ---

async fn list_dentists(
    State(state): State<AppState>,
    Query(filter): Query<ActiveFilter>,
) -> Json<Vec<Dentist>> {
    let store = state.store.read().await;
    let mut rows: Vec<Dentist> = store
        .dentists
        .values()
        .filter(|d| filter.active.map_or(true, |active| d.is_active == active))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Json(rows)
}

async fn get_dentist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Dentist>> {
    let store = state.store.read().await;
    store
        .dentists
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Dentista"))
}

async fn create_dentist(
    State(state): State<AppState>,
    Json(input): Json<CreateDentist>,
) -> ApiResult<(StatusCode, Json<Dentist>)> {
    required("name", &input.name)?;
    required("crm", &input.crm)?;
    let now = Utc::now();
    let dentist = Dentist {
        id: new_id(),
        name: input.name,
        crm: input.crm,
        specialty: input.specialty,
        phone: input.phone,
        email: input.email,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .write()
        .await
        .dentists
        .insert(dentist.id.clone(), dentist.clone());
    Ok((StatusCode::CREATED, Json(dentist)))
}

async fn update_dentist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateDentist>,
) -> ApiResult<Json<Dentist>> {
    let mut store = state.store.write().await;
    let dentist = store
        .dentists
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Dentista"))?;
    if let Some(name) = input.name {
        dentist.name = name;
    }
    if let Some(crm) = input.crm {
        dentist.crm = crm;
    }
    if let Some(specialty) = input.specialty {
        dentist.specialty = specialty;
    }
    if let Some(phone) = input.phone {
        dentist.phone = phone;
    }
    if let Some(email) = input.email {
        dentist.email = email;
    }
    if let Some(is_active) = input.is_active {
        dentist.is_active = is_active;
    }
    dentist.updated_at = Utc::now();
    Ok(Json(dentist.clone()))
}

async fn delete_dentist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store
        .dentists
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::not_found("Dentista"))
}

// --- treatments ---

async fn list_treatments(
    State(state): State<AppState>,
    Query(filter): Query<ActiveFilter>,
) -> Json<Vec<Treatment>> {
    let store = state.store.read().await;
    let mut rows: Vec<Treatment> = store
        .treatments
        .values()
        .filter(|t| filter.active.map_or(true, |active| t.is_active == active))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Json(rows)
}

async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Treatment>> {
    let store = state.store.read().await;
    store
        .treatments
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Tratamento"))
}

async fn create_treatment(
    State(state): State<AppState>,
    Json(input): Json<CreateTreatment>,
) -> ApiResult<(StatusCode, Json<Treatment>)> {
    required("name", &input.name)?;
    if input.duration == 0 {
        return Err(AppError::invalid("Duração deve ser maior que zero"));
    }
    let now = Utc::now();
    let treatment = Treatment {
        id: new_id(),
        name: input.name,
        description: input.description,
        duration: input.duration,
        price: input.price,
        category: input.category,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .write()
        .await
        .treatments
        .insert(treatment.id.clone(), treatment.clone());
    Ok((StatusCode::CREATED, Json(treatment)))
}

async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTreatment>,
) -> ApiResult<Json<Treatment>> {
    let mut store = state.store.write().await;
    let treatment = store
        .treatments
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Tratamento"))?;
    if let Some(name) = input.name {
        treatment.name = name;
    }
    if let Some(description) = input.description {
        treatment.description = description;
    }
    if let Some(duration) = input.duration {
        treatment.duration = duration;
    }
    if let Some(price) = input.price {
        treatment.price = price;
    }
    if let Some(category) = input.category {
        treatment.category = category;
    }
    if let Some(is_active) = input.is_active {
        treatment.is_active = is_active;
    }
    treatment.updated_at = Utc::now();
    Ok(Json(treatment.clone()))
}

async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store
        .treatments
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::not_found("Tratamento"))
}

// --- patients ---

async fn list_patients(State(state): State<AppState>) -> Json<Vec<Patient>> {
    let store = state.store.read().await;
    let mut rows: Vec<Patient> = store.patients.values().cloned().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Json(rows)
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Patient>> {
    let store = state.store.read().await;
    store
        .patients
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Paciente"))
}

async fn create_patient(
    State(state): State<AppState>,
    Json(input): Json<CreatePatient>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    required("name", &input.name)?;
    required("cpf", &input.cpf)?;
    let now = Utc::now();
    let patient = Patient {
        id: new_id(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        cpf: input.cpf,
        birth_date: input.birth_date,
        address: input.address,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .write()
        .await
        .patients
        .insert(patient.id.clone(), patient.clone());
    Ok((StatusCode::CREATED, Json(patient)))
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePatient>,
) -> ApiResult<Json<Patient>> {
    let mut store = state.store.write().await;
    let patient = store
        .patients
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Paciente"))?;
    if let Some(name) = input.name {
        patient.name = name;
    }
    if let Some(email) = input.email {
        patient.email = email;
    }
    if let Some(phone) = input.phone {
        patient.phone = phone;
    }
    if let Some(cpf) = input.cpf {
        patient.cpf = cpf;
    }
    if input.birth_date.is_some() {
        patient.birth_date = input.birth_date;
    }
    if input.address.is_some() {
        patient.address = input.address;
    }
    patient.updated_at = Utc::now();
    Ok(Json(patient.clone()))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store
        .patients
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::not_found("Paciente"))
}

// --- users ---

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let store = state.store.read().await;
    let mut rows: Vec<User> = store.accounts.values().map(|a| a.user.clone()).collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Json(rows)
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    let store = state.store.read().await;
    store
        .accounts
        .get(&id)
        .map(|a| Json(a.user.clone()))
        .ok_or_else(|| AppError::not_found("Usuário"))
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    required("name", &input.name)?;
    required("email", &input.email)?;
    let mut store = state.store.write().await;
    if store.email_taken(&input.email, None) {
        return Err(AppError::new(StatusCode::CONFLICT, "E-mail já cadastrado"));
    }
    let user = User {
        id: new_id(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        cpf: input.cpf,
        birth_date: input.birth_date,
        role: input.role,
    };
    store.accounts.insert(
        user.id.clone(),
        Account {
            user: user.clone(),
            password: input.password,
        },
    );
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<Json<User>> {
    let mut store = state.store.write().await;
    if let Some(email) = &input.email {
        if store.email_taken(email, Some(&id)) {
            return Err(AppError::new(StatusCode::CONFLICT, "E-mail já cadastrado"));
        }
    }
    let user = &mut store
        .accounts
        .get_mut(&id)
        .ok_or_else(|| AppError::not_found("Usuário"))?
        .user;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(phone) = input.phone {
        user.phone = phone;
    }
    if let Some(cpf) = input.cpf {
        user.cpf = cpf;
    }
    if input.birth_date.is_some() {
        user.birth_date = input.birth_date;
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let removed = store.accounts.remove(&id);
    if removed.is_some() {
        store.tokens.retain(|_, user_id| user_id != &id);
    }
    removed
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::not_found("Usuário"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_status_code() {
        let response = AppError::not_found("Dentista").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(required("name", "  ").is_err());
        assert!(required("name", "Ana").is_ok());
    }

    #[tokio::test]
    async fn seeded_store_has_admin() {
        let state = AppState::new();
        let store = state.store.read().await;
        assert!(store.email_taken(ADMIN_EMAIL, None));
        assert!(!store.email_taken(ADMIN_EMAIL, Some(ADMIN_ID)));
        assert!(store.dentists.contains_key(DENTIST_ID));
    }

    #[tokio::test]
    async fn present_attaches_summaries() {
        let state = AppState::new();
        let store = state.store.read().await;
        let now = Utc::now();
        let appointment = Appointment {
            id: "a1".to_string(),
            user_id: ADMIN_ID.to_string(),
            dentist_id: DENTIST_ID.to_string(),
            scheduled_date: now.naive_utc(),
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            treatment_type: "limpeza".to_string(),
            created_at: now,
            updated_at: now,
            user: None,
            dentist: None,
        };
        let shown = store.present(&appointment);
        assert_eq!(shown.user.unwrap().email, ADMIN_EMAIL);
        assert_eq!(shown.dentist.unwrap().name, "Dra. Ana Souza");
    }
}
