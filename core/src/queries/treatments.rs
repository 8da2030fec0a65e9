use std::sync::Arc;

use super::{is_blank, minutes};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{run_mutation, MutationMessages, QueryCache, QueryOptions, QueryResult};
use crate::services::TreatmentService;
use crate::types::{CreateTreatment, Treatment, UpdateTreatment};

pub mod keys {
    use crate::query::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::from(["treatments"])
    }

    pub fn active() -> QueryKey {
        all().with("active")
    }

    pub fn detail(id: &str) -> QueryKey {
        all().with(id)
    }
}

/// Treatments rarely change, so every read keeps its value longer.
const CATALOG: QueryOptions = QueryOptions {
    stale_time: minutes(5),
    gc_time: minutes(10),
};

const CREATED: MutationMessages = MutationMessages {
    success: "Tratamento criado com sucesso!",
    failure: "Erro ao criar tratamento",
};
const UPDATED: MutationMessages = MutationMessages {
    success: "Tratamento atualizado com sucesso!",
    failure: "Erro ao atualizar tratamento",
};
const DELETED: MutationMessages = MutationMessages {
    success: "Tratamento removido com sucesso!",
    failure: "Erro ao remover tratamento",
};

#[derive(Clone)]
pub struct TreatmentQueries {
    cache: QueryCache,
    service: TreatmentService,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for TreatmentQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreatmentQueries").finish_non_exhaustive()
    }
}

impl TreatmentQueries {
    pub fn new(cache: QueryCache, service: TreatmentService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache,
            service,
            notifier,
        }
    }

    pub fn list(&self) -> QueryResult<Vec<Treatment>> {
        let service = self.service.clone();
        self.cache
            .query(keys::all(), CATALOG, move || async move {
                service.list().await
            })
    }

    pub fn active(&self) -> QueryResult<Vec<Treatment>> {
        let service = self.service.clone();
        self.cache
            .query(keys::active(), CATALOG, move || async move {
                service.list_active().await
            })
    }

    pub fn by_id(&self, id: &str) -> QueryResult<Treatment> {
        if is_blank(id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let id = id.to_string();
        self.cache
            .query(keys::detail(&id), CATALOG, move || async move {
                service.get(&id).await
            })
    }

    pub async fn create(&self, input: &CreateTreatment) -> Result<Treatment, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            CREATED,
            self.service.create(input),
            |_| self.invalidate_lists(),
        )
        .await
    }

    pub async fn update(&self, id: &str, input: &UpdateTreatment) -> Result<Treatment, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            UPDATED,
            self.service.update(id, input),
            |treatment| {
                self.invalidate_lists();
                self.cache.set_query_data(keys::detail(&treatment.id), treatment.clone());
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
