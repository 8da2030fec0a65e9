//! Client-side query cache and mutation helper.

mod cache;
mod key;
mod mutation;

pub use cache::{
    QueryCache, QueryEvent, QueryEventKind, QueryOptions, QueryResult, QueryStatus, Subscription,
    DEFAULT_GC_TIME,
};
pub use key::QueryKey;
pub use mutation::{run_mutation, MutationMessages};
