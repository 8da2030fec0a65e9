use std::sync::Arc;

use super::is_blank;
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{run_mutation, MutationMessages, QueryCache, QueryOptions, QueryResult};
use crate::services::DentistService;
use crate::types::{CreateDentist, Dentist, UpdateDentist};

pub mod keys {
    use crate::query::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::from(["dentists"])
    }

    pub fn active() -> QueryKey {
        all().with("active")
    }

    pub fn detail(id: &str) -> QueryKey {
        all().with(id)
    }
}

const CREATED: MutationMessages = MutationMessages {
    success: "Dentista criado com sucesso!",
    failure: "Erro ao criar dentista",
};
const UPDATED: MutationMessages = MutationMessages {
    success: "Dentista atualizado com sucesso!",
    failure: "Erro ao atualizar dentista",
};
const DELETED: MutationMessages = MutationMessages {
    success: "Dentista removido com sucesso!",
    failure: "Erro ao remover dentista",
};

#[derive(Clone)]
pub struct DentistQueries {
    cache: QueryCache,
    service: DentistService,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for DentistQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DentistQueries").finish_non_exhaustive()
    }
}

impl DentistQueries {
    pub fn new(cache: QueryCache, service: DentistService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache,
            service,
            notifier,
        }
    }

    pub fn list(&self) -> QueryResult<Vec<Dentist>> {
        let service = self.service.clone();
        self.cache
            .query(keys::all(), QueryOptions::default(), move || async move {
                service.list().await
            })
    }

    pub fn active(&self) -> QueryResult<Vec<Dentist>> {
        let service = self.service.clone();
        self.cache
            .query(keys::active(), QueryOptions::default(), move || async move {
                service.list_active().await
            })
    }

    pub fn by_id(&self, id: &str) -> QueryResult<Dentist> {
        if is_blank(id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let id = id.to_string();
        self.cache
            .query(keys::detail(&id), QueryOptions::default(), move || async move {
                service.get(&id).await
            })
    }

    pub async fn create(&self, input: &CreateDentist) -> Result<Dentist, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            CREATED,
            self.service.create(input),
            |_| self.invalidate_lists(),
        )
        .await
    }

    pub async fn update(&self, id: &str, input: &UpdateDentist) -> Result<Dentist, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            UPDATED,
            self.service.update(id, input),
            |dentist| {
                self.invalidate_lists();
                self.cache.set_query_data(keys::detail(&dentist.id), dentist.clone());
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            DELETED,
            self.service.delete(id),
            |_| self.invalidate_lists(),
        )
        .await
    }

    fn invalidate_lists(&self) {
        self.cache.invalidate_queries(&keys::all());
        self.cache.invalidate_queries(&keys::active());
    }
}
