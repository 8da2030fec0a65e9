//! Keyed, type-erased cache of query results.
//!
//! # Design
//! `QueryCache` is an explicit object handed to whoever needs it; cloning it
//! shares the same store. Each entry holds the last good value, when it was
//! written, whether it was invalidated, the last error, the fetch in flight
//! and the listeners observing it.
//!
//! Fetches are `Shared` futures spawned on the tokio runtime. A second reader
//! of a key with a fetch in flight joins it instead of starting another, and
//! dropping a reader never cancels the fetch. The fetch itself writes its
//! result into the slot when it completes, so whichever response lands last
//! is what the slot holds.
//!
//! Every entry carries a generation, bumped by invalidation and by direct
//! writes. Both also detach the fetch in flight, so the next read starts a
//! new one. A fetch that started in an older generation is discarded when it
//! lands.
//!
//! A slot holds one type. A read or write with another type is refused with
//! an `ErrorKind::Unknown` error instead of touching the slot.
//!
//! Methods that may start a fetch must run inside a tokio runtime.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use super::key::QueryKey;
use crate::error::ApiError;
use crate::notify::Notifier;

type AnyValue = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<AnyValue, ApiError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type Listener = Arc<dyn Fn(&QueryEvent) + Send + Sync>;

pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

const MISMATCH_MESSAGE: &str = "Tipo inesperado no cache";

/// Freshness and retention windows for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a written value counts as fresh. Zero means always stale.
    pub stale_time: Duration,
    /// How long an unobserved, idle entry survives before eviction.
    pub gc_time: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl QueryOptions {
    pub fn stale_for(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn keep_for(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEventKind {
    Updated,
    Invalidated,
    Removed,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub key: QueryKey,
    pub kind: QueryEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Disabled query, or a read refused because the slot holds another
    /// type. Nothing was fetched.
    Idle,
    /// No value yet; a fetch is in flight.
    Loading,
    /// Served from cache without touching the network.
    Fresh,
    /// Stale value returned; a fetch is in flight to replace it.
    Refreshing,
}

/// Snapshot handed back by a read, plus a handle on the pending fetch.
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    pub status: QueryStatus,
    /// Error left by the previous fetch of this key, if it failed.
    pub error: Option<ApiError>,
    pending: Option<SharedFetch>,
}

impl<T: fmt::Debug> fmt::Debug for QueryResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("data", &self.data)
            .field("status", &self.status)
            .field("error", &self.error)
            .field("fetching", &self.pending.is_some())
            .finish()
    }
}

impl<T: Send + Sync + 'static> QueryResult<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            pending: None,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending fetch, or return the cached value if there is
    /// none.
    pub async fn settle(self) -> Result<Arc<T>, ApiError> {
        if let Some(fetch) = self.pending {
            return downcast(fetch.await?);
        }
        match self.data {
            Some(data) => Ok(data),
            None => Err(self
                .error
                .unwrap_or_else(|| ApiError::unknown("Consulta desativada"))),
        }
    }
}

/// Keeps a listener registered until dropped.
pub struct Subscription {
    cache: Weak<Inner>,
    key: QueryKey,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.cache.upgrade() else {
            return;
        };
        let mut entries = inner.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.listeners.retain(|(id, _)| *id != self.id);
            entry.last_active = Instant::now();
        }
    }
}

struct Entry {
    data: Option<AnyValue>,
    updated_at: Option<Instant>,
    invalidated: bool,
    generation: u64,
    error: Option<ApiError>,
    options: QueryOptions,
    fetch: Option<(u64, SharedFetch)>,
    listeners: Vec<(u64, Listener)>,
    last_active: Instant,
}

impl Entry {
    fn new(options: QueryOptions, now: Instant) -> Self {
        Self {
            data: None,
            updated_at: None,
            invalidated: false,
            generation: 0,
            error: None,
            options,
            fetch: None,
            listeners: Vec::new(),
            last_active: now,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        if self.invalidated || self.data.is_none() {
            return false;
        }
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) < self.options.stale_time,
            None => false,
        }
    }

    fn is_collectable(&self, now: Instant) -> bool {
        self.listeners.is_empty()
            && self.fetch.is_none()
            && now.saturating_duration_since(self.last_active) >= self.options.gc_time
    }

    fn listener_handles(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    ids: AtomicU64,
    notifier: Option<Arc<dyn Notifier>>,
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Failed loads are reported to `notifier` (once per fetch). 401s are
    /// not: session teardown takes over for those.
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self::build(Some(notifier))
    }

    fn build(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                ids: AtomicU64::new(1),
                notifier,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Read `key`. A fresh value is returned without any network call.
    /// Otherwise the best value available (possibly none) is returned at
    /// once while `fetcher` runs in the background, unless a fetch for the
    /// key is already in flight, in which case that one is shared.
    pub fn query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        sweep(&mut entries, now);

        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(options, now));
        let data = match entry.data.clone().map(downcast::<T>).transpose() {
            Ok(data) => data,
            Err(err) => {
                return QueryResult {
                    data: None,
                    status: QueryStatus::Idle,
                    error: Some(err),
                    pending: None,
                };
            }
        };
        entry.options = options;
        entry.last_active = now;

        if entry.is_fresh(now) {
            tracing::debug!(%key, "query served from cache");
            return QueryResult {
                data,
                status: QueryStatus::Fresh,
                error: None,
                pending: None,
            };
        }

        let error = entry.error.clone();
        let pending = self.start_fetch(&key, entry, fetcher);
        QueryResult {
            status: if data.is_some() {
                QueryStatus::Refreshing
            } else {
                QueryStatus::Loading
            },
            data,
            error,
            pending: Some(pending),
        }
    }

    /// Like `query`, but waits until a value is available.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        self.query(key, options, fetcher).settle().await
    }

    /// Warm `key` in the background. No-op if it is fresh or already being
    /// fetched.
    pub fn prefetch_query<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let _ = self.query(key, options, fetcher);
    }

    fn start_fetch<T, F, Fut>(&self, key: &QueryKey, entry: &mut Entry, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if let Some((_, fetch)) = &entry.fetch {
            tracing::debug!(%key, "joining fetch in flight");
            return fetch.clone();
        }

        let id = self.inner.ids.fetch_add(1, Ordering::Relaxed);
        let generation = entry.generation;
        let cache = Arc::downgrade(&self.inner);
        let key = key.clone();
        let fetch = async move {
            tracing::debug!(%key, "fetching query");
            let result = fetcher().await.map(|value| Arc::new(value) as AnyValue);
            if let Some(inner) = cache.upgrade() {
                QueryCache { inner }.finish_fetch(&key, id, generation, &result);
            }
            result
        }
        .boxed()
        .shared();

        entry.fetch = Some((id, fetch.clone()));
        tokio::spawn(fetch.clone());
        fetch
    }

    fn finish_fetch(&self, key: &QueryKey, id: u64, generation: u64, result: &FetchResult) {
        let now = Instant::now();
        let (listeners, event) = {
            let mut entries = self.lock();
            // Removed while in flight: the result is dropped.
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            if entry.fetch.as_ref().map(|(current, _)| *current) == Some(id) {
                entry.fetch = None;
            }
            if entry.generation != generation {
                tracing::debug!(%key, "discarding fetch started before the last invalidation");
                return;
            }
            entry.last_active = now;
            let kind = match result {
                Ok(value) => {
                    entry.data = Some(value.clone());
                    entry.updated_at = Some(now);
                    entry.invalidated = false;
                    entry.error = None;
                    QueryEventKind::Updated
                }
                Err(err) => {
                    entry.error = Some(err.clone());
                    QueryEventKind::Failed(err.clone())
                }
            };
            (
                entry.listener_handles(),
                QueryEvent {
                    key: key.clone(),
                    kind,
                },
            )
        };

        if let QueryEventKind::Failed(err) = &event.kind {
            tracing::warn!(%key, status = err.status_code, message = %err.message, "query failed");
            if let Some(notifier) = self.inner.notifier.as_ref().filter(|_| !err.is_unauthorized()) {
                notifier.error(&err.message);
            }
        }
        emit(&listeners, &event);
    }

    /// Replace the value of `key` with one already known (e.g. returned by a
    /// mutation). The slot becomes fresh and any fetch in flight for it is
    /// superseded. A slot holding a value of another type is left untouched
    /// and `false` is returned.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) -> bool {
        let now = Instant::now();
        let listeners = {
            let mut entries = self.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(QueryOptions::default(), now));
            if let Some(existing) = &entry.data {
                if !existing.is::<T>() {
                    tracing::warn!(%key, "write refused: slot holds another type");
                    return false;
                }
            }
            entry.generation += 1;
            entry.fetch = None;
            entry.data = Some(Arc::new(value));
            entry.updated_at = Some(now);
            entry.invalidated = false;
            entry.error = None;
            entry.last_active = now;
            entry.listener_handles()
        };
        emit(
            &listeners,
            &QueryEvent {
                key,
                kind: QueryEventKind::Updated,
            },
        );
        true
    }

    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.lock();
        let value = entries.get(key)?.data.clone()?;
        downcast(value).ok()
    }

    /// Mark every entry under `prefix` stale so its next read refetches,
    /// even if a fetch is already in flight. Returns how many entries were
    /// marked.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let notified: Vec<(QueryKey, Vec<Listener>)> = {
            let mut entries = self.lock();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    entry.generation += 1;
                    entry.fetch = None;
                    (key.clone(), entry.listener_handles())
                })
                .collect()
        };
        tracing::debug!(%prefix, count = notified.len(), "invalidated queries");
        for (key, listeners) in &notified {
            emit(
                listeners,
                &QueryEvent {
                    key: key.clone(),
                    kind: QueryEventKind::Invalidated,
                },
            );
        }
        notified.len()
    }

    /// Drop every entry under `prefix`. A fetch still in flight for one of
    /// them completes without writing anything.
    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let removed: Vec<(QueryKey, Vec<Listener>)> = {
            let mut entries = self.lock();
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            keys.into_iter()
                .filter_map(|key| {
                    let entry = entries.remove(&key)?;
                    Some((key, entry.listener_handles()))
                })
                .collect()
        };
        for (key, listeners) in &removed {
            emit(
                listeners,
                &QueryEvent {
                    key: key.clone(),
                    kind: QueryEventKind::Removed,
                },
            );
        }
        removed.len()
    }

    /// Drop exactly `key`, leaving longer keys under it alone.
    pub fn remove_query(&self, key: &QueryKey) -> bool {
        let removed = self.lock().remove(key);
        let Some(entry) = removed else {
            return false;
        };
        emit(
            &entry.listener_handles(),
            &QueryEvent {
                key: key.clone(),
                kind: QueryEventKind::Removed,
            },
        );
        true
    }

    /// Absent, invalidated or past its staleness window.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.lock();
        entries
            .get(key)
            .map_or(true, |entry| !entry.is_fresh(Instant::now()))
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        let entries = self.lock();
        entries.get(key).is_some_and(|entry| entry.fetch.is_some())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn subscribe(
        &self,
        key: QueryKey,
        listener: impl Fn(&QueryEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let now = Instant::now();
        let id = self.inner.ids.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(QueryOptions::default(), now));
        entry.listeners.push((id, Arc::new(listener)));
        entry.last_active = now;
        Subscription {
            cache: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.lock().get(key).map_or(0, |entry| entry.listeners.len())
    }

    /// Evict entries nobody observes, that are not fetching, and that have
    /// been idle for their whole retention window. Also runs on every read.
    pub fn collect_garbage(&self) -> usize {
        sweep(&mut self.lock(), Instant::now())
    }

    /// Drop everything, e.g. when the signed-in user changes.
    pub fn clear(&self) {
        let removed: Vec<(QueryKey, Vec<Listener>)> = {
            let mut entries = self.lock();
            entries
                .drain()
                .map(|(key, entry)| (key, entry.listener_handles()))
                .collect()
        };
        for (key, listeners) in &removed {
            emit(
                listeners,
                &QueryEvent {
                    key: key.clone(),
                    kind: QueryEventKind::Removed,
                },
            );
        }
    }
}

fn sweep(entries: &mut HashMap<QueryKey, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|key, entry| {
        let keep = !entry.is_collectable(now);
        if !keep {
            tracing::debug!(%key, "evicting idle query");
        }
        keep
    });
    before - entries.len()
}

fn emit(listeners: &[Listener], event: &QueryEvent) {
    for listener in listeners {
        listener(event);
    }
}

fn downcast<T: Send + Sync + 'static>(value: AnyValue) -> Result<Arc<T>, ApiError> {
    value.downcast::<T>().map_err(|_| {
        tracing::warn!(
            expected = std::any::type_name::<T>(),
            "cached value has a different type"
        );
        ApiError::unknown(MISMATCH_MESSAGE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLog;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Semaphore;

    fn key() -> QueryKey {
        QueryKey::from(["appointments"])
    }

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    /// Fetcher that counts its invocations and yields `value`.
    fn counted(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> futures::future::Ready<Result<u32, ApiError>> + Send + 'static {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(value))
        }
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let readers: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let calls = calls.clone();
                let gate = gate.clone();
                tokio::spawn(async move {
                    let options = QueryOptions::default().stale_for(minutes(1));
                    cache
                        .fetch_query(key(), options, move || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            let _permit = gate.acquire().await.map_err(|_| ApiError::unknown("closed"))?;
                            Ok::<_, ApiError>(vec![i])
                        })
                        .await
                })
            })
            .collect();

        tokio::task::yield_now().await;
        gate.add_permits(1);

        let results: Vec<Arc<Vec<i32>>> = futures::future::join_all(readers)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_value_skips_network() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_for(minutes(2));

        let first = cache.fetch_query(key(), options, counted(&calls, 1)).await.unwrap();
        let second = cache.query(key(), options, counted(&calls, 2));

        assert_eq!(*first, 1);
        assert_eq!(second.status, QueryStatus::Fresh);
        assert_eq!(second.data.as_deref(), Some(&1));
        assert!(!second.is_fetching());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_value_is_served_while_refetching() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_for(minutes(1));

        cache.fetch_query(key(), options, counted(&calls, 1)).await.unwrap();
        tokio::time::advance(minutes(1) + Duration::from_secs(1)).await;

        let read = cache.query(key(), options, counted(&calls, 2));
        assert_eq!(read.status, QueryStatus::Refreshing);
        assert_eq!(read.data.as_deref(), Some(&1));

        let refreshed = read.settle().await.unwrap();
        assert_eq!(*refreshed, 2);
        assert_eq!(cache.get_query_data::<u32>(&key()).as_deref(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn absent_value_reports_loading() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let read = cache.query(key(), QueryOptions::default(), counted(&calls, 5));
        assert_eq!(read.status, QueryStatus::Loading);
        assert!(read.data.is_none());
        assert_eq!(*read.settle().await.unwrap(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_marks_whole_family_stale() {
        let cache = QueryCache::new();
        let options = QueryOptions::default().stale_for(minutes(5));
        let calls = Arc::new(AtomicUsize::new(0));

        let week = QueryKey::from(["appointments", "date-range", "2024-08-25", "2024-08-31"]);
        let dentists = QueryKey::from(["dentists"]);
        cache.fetch_query(week.clone(), options, counted(&calls, 1)).await.unwrap();
        cache.fetch_query(dentists.clone(), options, counted(&calls, 1)).await.unwrap();

        let marked = cache.invalidate_queries(&QueryKey::from(["appointments", "date-range"]));

        assert_eq!(marked, 1);
        assert!(cache.is_stale(&week));
        assert!(!cache.is_stale(&dentists));

        let read = cache.query(week.clone(), options, counted(&calls, 2));
        assert_eq!(read.status, QueryStatus::Refreshing);
        read.settle().await.unwrap();
        assert!(!cache.is_stale(&week));
    }

    #[tokio::test]
    async fn set_query_data_makes_slot_fresh() {
        let cache = QueryCache::new();
        let detail = QueryKey::from(["appointments", "a1"]);
        cache.set_query_data(detail.clone(), "confirmed".to_string());

        let read = cache.query(
            detail.clone(),
            QueryOptions::default().stale_for(minutes(5)),
            || async { Err::<String, _>(ApiError::unknown("should not fetch")) },
        );
        assert_eq!(read.status, QueryStatus::Fresh);
        assert_eq!(read.data.as_deref().map(String::as_str), Some("confirmed"));
    }

    #[tokio::test]
    async fn remove_drops_entries_under_prefix() {
        let cache = QueryCache::new();
        cache.set_query_data(QueryKey::from(["appointments", "a1"]), 1u32);
        cache.set_query_data(QueryKey::from(["appointments", "a2"]), 2u32);
        cache.set_query_data(QueryKey::from(["patients"]), 3u32);

        assert_eq!(cache.remove_queries(&QueryKey::from(["appointments", "a1"])), 1);
        assert!(!cache.contains(&QueryKey::from(["appointments", "a1"])));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn listeners_see_updates_and_invalidations() {
        let cache = QueryCache::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = cache.subscribe(key(), move |event| {
            sink.lock().unwrap().push(event.kind.clone());
        });

        cache
            .fetch_query(key(), QueryOptions::default(), || async { Ok::<_, ApiError>(1u8) })
            .await
            .unwrap();
        cache.invalidate_queries(&key());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![QueryEventKind::Updated, QueryEventKind::Invalidated]);
    }

    #[tokio::test]
    async fn dropping_subscription_unregisters_listener() {
        let cache = QueryCache::new();
        let sub = cache.subscribe(key(), |_| {});
        assert_eq!(cache.subscriber_count(&key()), 1);
        drop(sub);
        assert_eq!(cache.subscriber_count(&key()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_entries_are_evicted_after_retention() {
        let cache = QueryCache::new();
        cache.set_query_data(key(), 1u32);

        tokio::time::advance(DEFAULT_GC_TIME - Duration::from_secs(1)).await;
        assert_eq!(cache.collect_garbage(), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.collect_garbage(), 1);
        assert!(cache.get_query_data::<u32>(&key()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn observed_entries_are_retained() {
        let cache = QueryCache::new();
        cache.set_query_data(key(), 1u32);
        let sub = cache.subscribe(key(), |_| {});

        tokio::time::advance(DEFAULT_GC_TIME * 2).await;
        assert_eq!(cache.collect_garbage(), 0);

        drop(sub);
        tokio::time::advance(DEFAULT_GC_TIME).await;
        assert_eq!(cache.collect_garbage(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_previous_value_and_notifies() {
        let toasts = Arc::new(ToastLog::new());
        let cache = QueryCache::with_notifier(toasts.clone());
        cache.set_query_data(key(), 7u32);
        cache.invalidate_queries(&key());

        let err = cache
            .fetch_query(key(), QueryOptions::default(), || async {
                Err::<u32, _>(ApiError::from_status(500, ""))
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code, 500);
        assert_eq!(cache.get_query_data::<u32>(&key()).as_deref(), Some(&7));
        assert_eq!(toasts.errors(), vec!["Erro interno do servidor".to_string()]);
    }

    #[tokio::test]
    async fn unauthorized_failure_is_not_toasted() {
        let toasts = Arc::new(ToastLog::new());
        let cache = QueryCache::with_notifier(toasts.clone());
        let _ = cache
            .fetch_query(key(), QueryOptions::default(), || async {
                Err::<u32, _>(ApiError::from_status(401, ""))
            })
            .await;
        assert!(toasts.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn prefetch_is_a_noop_when_fresh() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_for(minutes(1));

        cache.prefetch_query(key(), options, counted(&calls, 1));
        cache.fetch_query(key(), options, counted(&calls, 2)).await.unwrap();
        cache.prefetch_query(key(), options, counted(&calls, 3));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get_query_data::<u32>(&key()).as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn type_mismatch_is_an_error() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        cache.set_query_data(key(), vec![1u32, 2]);
        assert!(cache.get_query_data::<String>(&key()).is_none());

        let read = cache.query(key(), QueryOptions::default(), counted(&calls, 3));
        assert_eq!(read.status, QueryStatus::Idle);
        assert!(read.data.is_none());
        assert!(!read.is_fetching());

        let err = read.settle().await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Unknown);
        assert_eq!(err.message, "Tipo inesperado no cache");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.get_query_data::<Vec<u32>>(&key()).as_deref(), Some(&vec![1, 2]));
    }

    #[tokio::test]
    async fn write_of_another_type_leaves_slot_alone() {
        let cache = QueryCache::new();
        let list = QueryKey::from(["dentists", "active"]);
        assert!(cache.set_query_data(list.clone(), vec!["d1".to_string()]));

        assert!(!cache.set_query_data(list.clone(), "d2".to_string()));
        assert_eq!(
            cache.get_query_data::<Vec<String>>(&list).as_deref(),
            Some(&vec!["d1".to_string()])
        );
    }

    #[tokio::test]
    async fn invalidation_during_fetch_starts_a_new_one() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Semaphore::new(0));
        let options = QueryOptions::default().stale_for(minutes(5));

        let slow = {
            let calls = calls.clone();
            let gate = gate.clone();
            cache.query(key(), options, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let _permit = gate.acquire().await.map_err(|_| ApiError::unknown("closed"))?;
                Ok::<_, ApiError>(1u32)
            })
        };
        assert_eq!(slow.status, QueryStatus::Loading);

        cache.invalidate_queries(&key());
        let read = cache.query(key(), options, counted(&calls, 2));
        assert!(read.is_fetching());
        assert_eq!(*read.settle().await.unwrap(), 2);

        gate.add_permits(1);
        assert_eq!(*slow.settle().await.unwrap(), 1);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_query_data::<u32>(&key()).as_deref(), Some(&2));
        let next = cache.query(key(), options, counted(&calls, 3));
        assert_eq!(next.status, QueryStatus::Fresh);
        assert_eq!(next.data.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn fetch_in_flight_does_not_overwrite_direct_write() {
        let cache = QueryCache::new();
        let gate = Arc::new(Semaphore::new(0));
        let options = QueryOptions::default().stale_for(minutes(5));

        let slow = {
            let gate = gate.clone();
            cache.query(key(), options, move || async move {
                let _permit = gate.acquire().await.map_err(|_| ApiError::unknown("closed"))?;
                Ok::<_, ApiError>(1u32)
            })
        };
        cache.set_query_data(key(), 9u32);
        assert!(!cache.is_fetching(&key()));

        gate.add_permits(1);
        slow.settle().await.unwrap();

        assert_eq!(cache.get_query_data::<u32>(&key()).as_deref(), Some(&9));
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn remove_query_keeps_longer_keys() {
        let cache = QueryCache::new();
        let detail = QueryKey::from(["appointments", "date"]);
        let by_date = QueryKey::from(["appointments", "date", "2024-08-26"]);
        cache.set_query_data(detail.clone(), 1u32);
        cache.set_query_data(by_date.clone(), 2u32);

        assert!(cache.remove_query(&detail));
        assert!(!cache.remove_query(&detail));
        assert!(!cache.contains(&detail));
        assert_eq!(cache.get_query_data::<u32>(&by_date).as_deref(), Some(&2));
    }
}
