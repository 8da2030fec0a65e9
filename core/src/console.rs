//! Composition root: one object that wires the whole client together.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::{ClientConfig, ConfigError};
use crate::notify::Notifier;
use crate::queries::{AppointmentQueries, DentistQueries, PatientQueries, TreatmentQueries, UserQueries};
use crate::query::QueryCache;
use crate::routes::Navigator;
use crate::services::{
    AppointmentService, AuthService, DentistService, PatientService, TreatmentService, UserService,
};
use crate::session::{Session, SessionProvider};
use crate::storage::SessionStorage;
use crate::transport::{ReqwestTransport, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not build HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// Everything a console front end needs, sharing one cache, one session and
/// one client.
#[derive(Debug, Clone)]
pub struct Console {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub cache: QueryCache,
    pub session: SessionProvider,
    pub appointments: AppointmentQueries,
    pub dentists: DentistQueries,
    pub patients: PatientQueries,
    pub treatments: TreatmentQueries,
    pub users: UserQueries,
}

impl Console {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = QueryCache::with_notifier(notifier.clone());
        let session = Arc::new(Session::restore(storage.clone(), navigator, cache.clone()));
        let client = ApiClient::new(&config.api_base_url, transport, storage)
            .with_unauthorized_handler(session.clone());

        Self {
            session: SessionProvider::new(session, AuthService::new(client.clone())),
            appointments: AppointmentQueries::new(
                cache.clone(),
                AppointmentService::new(client.clone()),
                notifier.clone(),
                config.week_starts_on,
            ),
            dentists: DentistQueries::new(
                cache.clone(),
                DentistService::new(client.clone()),
                notifier.clone(),
            ),
            patients: PatientQueries::new(
                cache.clone(),
                PatientService::new(client.clone()),
                notifier.clone(),
            ),
            treatments: TreatmentQueries::new(
                cache.clone(),
                TreatmentService::new(client.clone()),
                notifier.clone(),
            ),
            users: UserQueries::new(cache.clone(), UserService::new(client.clone()), notifier),
            config,
            client,
            cache,
        }
    }

    /// Build over HTTP with `reqwest`, honoring the configured timeout.
    pub fn connect(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConsoleError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::new(config, transport, storage, navigator, notifier))
    }

    /// `connect` with configuration from the environment.
    pub fn from_env(
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConsoleError> {
        Self::connect(ClientConfig::from_env()?, storage, navigator, notifier)
    }
}
