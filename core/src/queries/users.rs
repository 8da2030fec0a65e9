use std::sync::Arc;

use super::{is_blank, minutes};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{
    run_mutation, MutationMessages, QueryCache, QueryOptions, QueryResult, DEFAULT_GC_TIME,
};
use crate::services::UserService;
use crate::types::{CreateUser, UpdateUser, User};

pub mod keys {
    use crate::query::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::from(["users"])
    }

    pub fn detail(id: &str) -> QueryKey {
        all().with(id)
    }
}

const READ: QueryOptions = QueryOptions {
    stale_time: minutes(2),
    gc_time: DEFAULT_GC_TIME,
};

const CREATED: MutationMessages = MutationMessages {
    success: "Usuário criado com sucesso!",
    failure: "Erro ao criar usuário",
};
const UPDATED: MutationMessages = MutationMessages {
    success: "Usuário atualizado com sucesso!",
    failure: "Erro ao atualizar usuário",
};
const DELETED: MutationMessages = MutationMessages {
    success: "Usuário removido com sucesso!",
    failure: "Erro ao remover usuário",
};

#[derive(Clone)]
pub struct UserQueries {
    cache: QueryCache,
    service: UserService,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for UserQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserQueries").finish_non_exhaustive()
    }
}

impl UserQueries {
    pub fn new(cache: QueryCache, service: UserService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache,
            service,
            notifier,
        }
    }

    pub fn list(&self) -> QueryResult<Vec<User>> {
        let service = self.service.clone();
        self.cache
            .query(keys::all(), READ, move || async move { service.list().await })
    }

    pub fn by_id(&self, id: &str) -> QueryResult<User> {
        if is_blank(id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let id = id.to_string();
        self.cache.query(keys::detail(&id), READ, move || async move {
            service.get(&id).await
        })
    }

    pub async fn create(&self, input: &CreateUser) -> Result<User, ApiError> {
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

    pub async fn update(&self, id: &str, input: &UpdateUser) -> Result<User, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            UPDATED,
            self.service.update(id, input),
            |user| {
                self.cache.invalidate_queries(&keys::all());
                self.cache.set_query_data(keys::detail(&user.id), user.clone());
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
