use std::sync::Arc;

use super::{is_blank, minutes};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{run_mutation, MutationMessages, QueryCache, QueryOptions, QueryResult};
use crate::services::PatientService;
use crate::types::{CreatePatient, Patient, UpdatePatient};

pub mod keys {
    use crate::query::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::from(["patients"])
    }

    pub fn detail(id: &str) -> QueryKey {
        all().with(id)
    }
}

const LIST: QueryOptions = QueryOptions {
    stale_time: minutes(2),
    gc_time: minutes(5),
};
const DETAIL: QueryOptions = QueryOptions {
    stale_time: minutes(5),
    gc_time: minutes(5),
};

const CREATED: MutationMessages = MutationMessages {
    success: "Paciente criado com sucesso!",
    failure: "Erro ao criar paciente",
};
const UPDATED: MutationMessages = MutationMessages {
    success: "Paciente atualizado com sucesso!",
    failure: "Erro ao atualizar paciente",
};
const DELETED: MutationMessages = MutationMessages {
    success: "Paciente removido com sucesso!",
    failure: "Erro ao remover paciente",
};

#[derive(Clone)]
pub struct PatientQueries {
    cache: QueryCache,
    service: PatientService,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for PatientQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientQueries").finish_non_exhaustive()
    }
}

impl PatientQueries {
    pub fn new(cache: QueryCache, service: PatientService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache,
            service,
            notifier,
        }
    }

    pub fn list(&self) -> QueryResult<Vec<Patient>> {
        let service = self.service.clone();
        self.cache
            .query(keys::all(), LIST, move || async move { service.list().await })
    }

    pub fn by_id(&self, id: &str) -> QueryResult<Patient> {
        if is_blank(id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let id = id.to_string();
        self.cache.query(keys::detail(&id), DETAIL, move || async move {
            service.get(&id).await
        })
    }

    pub async fn create(&self, input: &CreatePatient) -> Result<Patient, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            CREATED,
            self.service.create(input),
            |_| {
                self.cache.invalidate_queries(&keys::all());
            },
        )
        .await
    }

    pub async fn update(&self, id: &str, input: &UpdatePatient) -> Result<Patient, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            UPDATED,
            self.service.update(id, input),
            |patient| {
                self.cache.invalidate_queries(&keys::all());
                self.cache.set_query_data(keys::detail(&patient.id), patient.clone());
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            DELETED,
            self.service.delete(id),
            |_| {
                self.cache.invalidate_queries(&keys::all());
            },
        )
        .await
    }
}
