use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, Weekday};
use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

use super::{is_blank, minutes};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{
    run_mutation, MutationMessages, QueryCache, QueryKey, QueryOptions, QueryResult, DEFAULT_GC_TIME,
};
use crate::schedule::{self, UPCOMING_LIMIT};
use crate::services::AppointmentService;
use crate::types::{Appointment, AppointmentStatus, CreateAppointment};

/// Cache keys of the appointment queries. Every key starts with
/// `["appointments"]`.
pub mod keys {
    use chrono::{NaiveDate, Weekday};

    use crate::query::QueryKey;
    use crate::schedule::week_bounds;

    pub fn all() -> QueryKey {
        QueryKey::from(["appointments"])
    }

    pub fn detail(id: &str) -> QueryKey {
        all().with(id)
    }

    pub fn dates() -> QueryKey {
        all().with("date")
    }

    pub fn by_date(date: NaiveDate) -> QueryKey {
        dates().with(date.format("%Y-%m-%d"))
    }

    pub fn date_ranges() -> QueryKey {
        all().with("date-range")
    }

    pub fn by_date_range(start: NaiveDate, end: NaiveDate) -> QueryKey {
        date_ranges().with(start).with(end)
    }

    pub fn by_week(date: NaiveDate, week_starts_on: Weekday) -> QueryKey {
        let (start, end) = week_bounds(date, week_starts_on);
        by_date_range(start, end)
    }

    pub fn dentists() -> QueryKey {
        all().with("dentist")
    }

    pub fn by_dentist(dentist_id: &str) -> QueryKey {
        dentists().with(dentist_id)
    }

    pub fn users() -> QueryKey {
        all().with("user")
    }

    pub fn by_user(user_id: &str) -> QueryKey {
        users().with(user_id)
    }

    pub fn upcoming_all() -> QueryKey {
        all().with("upcoming")
    }

    pub fn upcoming(days: u32) -> QueryKey {
        upcoming_all().with(days)
    }
}

const LIST: QueryOptions = QueryOptions {
    stale_time: minutes(2),
    gc_time: minutes(5),
};
const DETAIL: QueryOptions = QueryOptions {
    stale_time: minutes(5),
    gc_time: DEFAULT_GC_TIME,
};
const BY_DATE: QueryOptions = QueryOptions {
    stale_time: minutes(1),
    gc_time: DEFAULT_GC_TIME,
};
const BY_WEEK: QueryOptions = QueryOptions {
    stale_time: minutes(1),
    gc_time: minutes(5),
};
const BY_OWNER: QueryOptions = QueryOptions {
    stale_time: minutes(2),
    gc_time: DEFAULT_GC_TIME,
};
const UPCOMING: QueryOptions = QueryOptions {
    stale_time: minutes(1),
    gc_time: DEFAULT_GC_TIME,
};

/// How often `poll_upcoming` refreshes the upcoming list by default.
pub const UPCOMING_POLL_INTERVAL: Duration = minutes(5);

const CREATED: MutationMessages = MutationMessages {
    success: "Consulta criada com sucesso!",
    failure: "Erro ao criar consulta",
};
const STATUS_UPDATED: MutationMessages = MutationMessages {
    success: "Status da consulta atualizado!",
    failure: "Erro ao atualizar status da consulta",
};
const CANCELLED: MutationMessages = MutationMessages {
    success: "Consulta cancelada com sucesso!",
    failure: "Erro ao cancelar consulta",
};

#[derive(Clone)]
pub struct AppointmentQueries {
    cache: QueryCache,
    service: AppointmentService,
    notifier: Arc<dyn Notifier>,
    week_starts_on: Weekday,
}

impl std::fmt::Debug for AppointmentQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppointmentQueries")
            .field("week_starts_on", &self.week_starts_on)
            .finish_non_exhaustive()
    }
}

impl AppointmentQueries {
    pub fn new(
        cache: QueryCache,
        service: AppointmentService,
        notifier: Arc<dyn Notifier>,
        week_starts_on: Weekday,
    ) -> Self {
        Self {
            cache,
            service,
            notifier,
            week_starts_on,
        }
    }

    pub fn week_starts_on(&self) -> Weekday {
        self.week_starts_on
    }

    pub fn list(&self) -> QueryResult<Vec<Appointment>> {
        let service = self.service.clone();
        self.cache
            .query(keys::all(), LIST, move || async move { service.list().await })
    }

    pub fn by_id(&self, id: &str) -> QueryResult<Appointment> {
        if is_blank(id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let id = id.to_string();
        self.cache.query(keys::detail(&id), DETAIL, move || async move {
            service.get(&id).await
        })
    }

    pub fn by_date(&self, date: NaiveDate) -> QueryResult<Vec<Appointment>> {
        let service = self.service.clone();
        self.cache.query(keys::by_date(date), BY_DATE, move || async move {
            service.list_by_date(date).await
        })
    }

    /// Appointments of the week containing `date`. There is no range
    /// endpoint, so the full list is fetched and filtered here.
    pub fn by_week(&self, date: NaiveDate) -> QueryResult<Vec<Appointment>> {
        let (key, fetch) = self.week_query(date);
        self.cache.query(key, BY_WEEK, fetch)
    }

    pub fn by_dentist(&self, dentist_id: &str) -> QueryResult<Vec<Appointment>> {
        if is_blank(dentist_id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let dentist_id = dentist_id.to_string();
        self.cache.query(keys::by_dentist(&dentist_id), BY_OWNER, move || async move {
            service.list_by_dentist(&dentist_id).await
        })
    }

    pub fn by_user(&self, user_id: &str) -> QueryResult<Vec<Appointment>> {
        if is_blank(user_id) {
            return QueryResult::idle();
        }
        let service = self.service.clone();
        let user_id = user_id.to_string();
        self.cache.query(keys::by_user(&user_id), BY_OWNER, move || async move {
            service.list_by_user(&user_id).await
        })
    }

    /// Next appointments from now through `days` days ahead, soonest first,
    /// at most ten. Derived from the full list.
    pub fn upcoming(&self, days: u32) -> QueryResult<Vec<Appointment>> {
        let service = self.service.clone();
        self.cache.query(keys::upcoming(days), UPCOMING, move || async move {
            let all = service.list().await?;
            let now = Local::now().naive_local();
            Ok::<_, ApiError>(schedule::filter_upcoming(&all, now, days, UPCOMING_LIMIT))
        })
    }

    /// Refresh the upcoming list every `every`, whether or not it is stale.
    /// Polling stops when the returned handle is dropped.
    pub fn poll_upcoming(&self, days: u32, every: Duration) -> PollHandle {
        let queries = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                queries.cache.invalidate_queries(&keys::upcoming(days));
                if let Err(err) = queries.upcoming(days).settle().await {
                    tracing::debug!(%err, "upcoming poll failed");
                }
            }
        });
        PollHandle(task)
    }

    /// Warm the week containing `date` without waiting. No-op when fresh.
    pub fn prefetch_week(&self, date: NaiveDate) {
        let (key, fetch) = self.week_query(date);
        self.cache.prefetch_query(key, BY_WEEK, fetch);
    }

    /// Warm the weeks before and after the one containing `date`.
    pub fn prefetch_adjacent_weeks(&self, date: NaiveDate) {
        self.prefetch_week(date - chrono::Duration::days(7));
        self.prefetch_week(date + chrono::Duration::days(7));
    }

    fn week_query(
        &self,
        date: NaiveDate,
    ) -> (
        QueryKey,
        impl FnOnce() -> BoxFuture<'static, Result<Vec<Appointment>, ApiError>> + Send + 'static,
    ) {
        let service = self.service.clone();
        let week_starts_on = self.week_starts_on;
        let fetch = move || {
            async move {
                let all = service.list().await?;
                Ok::<_, ApiError>(schedule::filter_week(&all, date, week_starts_on))
            }
            .boxed()
        };
        (keys::by_week(date, week_starts_on), fetch)
    }

    pub async fn create(&self, input: &CreateAppointment) -> Result<Appointment, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            CREATED,
            self.service.create(input),
            |created| self.after_create(created),
        )
        .await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            STATUS_UPDATED,
            self.service.update_status(id, status),
            |updated| {
                self.cache.invalidate_queries(&keys::all());
                self.cache.invalidate_queries(&keys::upcoming_all());
                self.cache
                    .invalidate_queries(&keys::by_date(updated.scheduled_date.date()));
                // After the family invalidation, so the confirmed value stays fresh.
                self.cache.set_query_data(keys::detail(&updated.id), updated.clone());
            },
        )
        .await
    }

    pub async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        run_mutation(
            self.notifier.as_ref(),
            CANCELLED,
            self.service.cancel(id),
            |_| {
                self.cache.remove_query(&keys::detail(id));
                self.cache.invalidate_queries(&keys::all());
                self.cache.invalidate_queries(&keys::upcoming_all());
                self.cache.invalidate_queries(&keys::dates());
                self.cache.invalidate_queries(&keys::date_ranges());
                self.cache.invalidate_queries(&keys::dentists());
                self.cache.invalidate_queries(&keys::users());
            },
        )
        .await
    }

    fn after_create(&self, created: &Appointment) {
        let day = created.scheduled_date.date();
        self.cache.invalidate_queries(&keys::all());
        self.cache.invalidate_queries(&keys::by_date(day));
        self.cache
            .invalidate_queries(&keys::by_week(day, self.week_starts_on));
        self.cache.invalidate_queries(&keys::date_ranges());
        self.cache
            .invalidate_queries(&keys::by_dentist(&created.dentist_id));
        self.cache.invalidate_queries(&keys::by_user(&created.user_id));
        self.cache.invalidate_queries(&keys::upcoming_all());
    }
}

/// Background refresh started by `poll_upcoming`. Aborts on drop.
#[derive(Debug)]
pub struct PollHandle(JoinHandle<()>);

impl PollHandle {
    pub fn stop(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::queries::fixtures::{harness, Harness};
    use crate::testing::{json_response, status_response, ScriptedTransport};
    use crate::query::QueryStatus;
    use chrono::NaiveDateTime;
    use serde_json::json;

    const BASE: &str = "http://localhost:5000";

    fn row(id: &str, when: &str) -> serde_json::Value {
        json!({
            "id": id, "userId": "u1", "dentistId": "d1",
            "scheduledDate": when, "status": "SCHEDULED", "treatmentType": "limpeza"
        })
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn queries(h: &Harness) -> AppointmentQueries {
        AppointmentQueries::new(
            h.cache.clone(),
            AppointmentService::new(h.client.clone()),
            h.toasts.clone(),
            Weekday::Sun,
        )
    }

    fn backend() -> Arc<ScriptedTransport> {
        ScriptedTransport::new(|req| match (req.method, req.path.as_str()) {
            (HttpMethod::Get, "http://localhost:5000/appointments") if req.query.is_empty() => json_response(
                200,
                json!([
                    row("a1", "2024-08-26T09:00:00"),
                    row("a2", "2024-09-02T09:00:00"),
                    row("a3", "2024-08-31T17:30:00"),
                ]),
            ),
            (HttpMethod::Get, "http://localhost:5000/appointments") => json_response(200, json!([])),
            (HttpMethod::Post, "http://localhost:5000/appointments") => {
                json_response(201, row("a9", "2024-08-27T10:00:00"))
            }
            (HttpMethod::Patch, "http://localhost:5000/appointments/a1/status") => {
                let mut updated = row("a1", "2024-08-26T09:00:00");
                updated["status"] = json!("CONFIRMED");
                json_response(200, updated)
            }
            (HttpMethod::Get, "http://localhost:5000/appointments/a1") => {
                json_response(200, row("a1", "2024-08-26T09:00:00"))
            }
            (HttpMethod::Delete, "http://localhost:5000/appointments/a1")
            | (HttpMethod::Delete, "http://localhost:5000/appointments/date") => status_response(204, ""),
            _ => status_response(404, ""),
        })
    }

    /// Seed `key` with a value that stays fresh for the list window.
    fn prime<T: Send + Sync + 'static>(cache: &QueryCache, key: QueryKey, value: T) {
        cache.set_query_data(key.clone(), value);
        let read = cache.query(key, LIST, || async { Err::<T, _>(ApiError::unknown("unexpected fetch")) });
        assert_eq!(read.status, QueryStatus::Fresh);
    }

    fn new_appointment() -> CreateAppointment {
        CreateAppointment {
            user_id: "u1".to_string(),
            dentist_id: "d1".to_string(),
            scheduled_date: NaiveDateTime::parse_from_str("2024-08-27T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
            treatment_type: "limpeza".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn concurrent_date_reads_send_one_request() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);

        let reads: Vec<_> = (0..5).map(|_| q.by_date(day(26)).settle()).collect();
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(
            transport.count(HttpMethod::Get, &format!("{BASE}/appointments?date=2024-08-26")),
            1
        );
    }

    #[tokio::test]
    async fn week_is_filtered_from_the_full_list() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);

        let week = q.by_week(day(28)).settle().await.unwrap();

        let ids: Vec<_> = week.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a3"]);
        assert_eq!(transport.count(HttpMethod::Get, &format!("{BASE}/appointments")), 1);
        assert!(h
            .cache
            .contains(&keys::by_date_range(day(25), day(31))));
    }

    #[tokio::test]
    async fn blank_ids_disable_the_query() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);

        assert_eq!(q.by_id("").status, QueryStatus::Idle);
        assert_eq!(q.by_dentist("  ").status, QueryStatus::Idle);
        assert!(q.by_user("").settle().await.is_err());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn create_invalidates_every_affected_view() {
        let h = harness(backend());
        let q = queries(&h);

        let affected = [
            keys::all(),
            keys::by_date(day(27)),
            keys::by_week(day(27), Weekday::Sun),
            keys::by_date_range(day(18), day(24)),
            keys::by_dentist("d1"),
            keys::by_user("u1"),
            keys::upcoming(7),
        ];
        for key in &affected {
            prime(&h.cache, key.clone(), Vec::<Appointment>::new());
        }
        let unrelated = QueryKey::from(["dentists"]);
        prime(&h.cache, unrelated.clone(), 0u8);

        let created = q.create(&new_appointment()).await.unwrap();

        assert_eq!(created.id, "a9");
        for key in &affected {
            assert!(h.cache.is_stale(key), "{key} should be stale");
        }
        assert!(!h.cache.is_stale(&unrelated));
        assert_eq!(h.toasts.last().unwrap().message, "Consulta criada com sucesso!");
    }

    #[tokio::test]
    async fn stale_list_refetches_after_create() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);

        q.list().settle().await.unwrap();
        assert_eq!(q.list().status, QueryStatus::Fresh);

        q.create(&new_appointment()).await.unwrap();

        let read = q.list();
        assert_eq!(read.status, QueryStatus::Refreshing);
        read.settle().await.unwrap();
        assert_eq!(transport.count(HttpMethod::Get, &format!("{BASE}/appointments")), 2);
    }

    #[tokio::test]
    async fn status_update_writes_detail_slot() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);
        q.by_id("a1").settle().await.unwrap();

        q.update_status("a1", AppointmentStatus::Confirmed).await.unwrap();

        let read = q.by_id("a1");
        assert_eq!(read.status, QueryStatus::Fresh);
        assert_eq!(read.data.unwrap().status, AppointmentStatus::Confirmed);
        assert_eq!(transport.count(HttpMethod::Get, &format!("{BASE}/appointments/a1")), 1);
        assert_eq!(h.toasts.last().unwrap().message, "Status da consulta atualizado!");
    }

    #[tokio::test]
    async fn cancel_removes_detail_and_invalidates_families() {
        let h = harness(backend());
        let q = queries(&h);
        prime(&h.cache, keys::detail("a1"), 1u8);
        prime(&h.cache, keys::by_dentist("d7"), 1u8);

        q.cancel("a1").await.unwrap();

        assert!(!h.cache.contains(&keys::detail("a1")));
        assert!(h.cache.is_stale(&keys::by_dentist("d7")));
        assert_eq!(h.toasts.last().unwrap().message, "Consulta cancelada com sucesso!");
    }

    #[tokio::test]
    async fn cancel_keeps_lists_whose_key_extends_the_id() {
        let h = harness(backend());
        let q = queries(&h);
        prime(&h.cache, keys::by_date(day(26)), Vec::<Appointment>::new());

        q.cancel("date").await.unwrap();

        assert!(h.cache.contains(&keys::by_date(day(26))));
        assert!(h.cache.is_stale(&keys::by_date(day(26))));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_alone() {
        let transport = ScriptedTransport::new(|_| status_response(422, r#"{"message":"Data inválida"}"#));
        let h = harness(transport);
        let q = queries(&h);
        prime(&h.cache, keys::all(), Vec::<Appointment>::new());

        let err = q.create(&new_appointment()).await.unwrap_err();

        assert_eq!(err.status_code, 422);
        assert!(!h.cache.is_stale(&keys::all()));
        assert_eq!(h.toasts.errors(), vec!["Data inválida".to_string()]);
    }

    #[tokio::test]
    async fn prefetch_warms_neighbouring_weeks() {
        let h = harness(backend());
        let q = queries(&h);

        q.prefetch_adjacent_weeks(day(28));
        let next = keys::by_date_range(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(), NaiveDate::from_ymd_opt(2024, 9, 7).unwrap());
        let previous = keys::by_date_range(day(18), day(24));

        let next_week = q.by_week(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()).settle().await.unwrap();
        q.by_week(day(20)).settle().await.unwrap();

        assert_eq!(next_week.len(), 1);
        assert!(h.cache.contains(&next));
        assert!(h.cache.contains(&previous));
    }

    #[tokio::test]
    async fn upcoming_keeps_only_the_window() {
        let now = Local::now().naive_local();
        let fmt = |dt: NaiveDateTime| dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        let past = fmt(now - chrono::Duration::hours(1));
        let soon = fmt(now + chrono::Duration::days(1));
        let later = fmt(now + chrono::Duration::days(2));
        let far = fmt(now + chrono::Duration::days(30));
        let transport = ScriptedTransport::new(move |_| {
            json_response(
                200,
                json!([row("far", &far), row("later", &later), row("past", &past), row("soon", &soon)]),
            )
        });
        let h = harness(transport);

        let upcoming = queries(&h).upcoming(7).settle().await.unwrap();

        let ids: Vec<_> = upcoming.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["soon", "later"]);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refreshes_upcoming() {
        let transport = backend();
        let h = harness(transport.clone());
        let q = queries(&h);
        q.upcoming(7).settle().await.unwrap();

        let handle = q.poll_upcoming(7, UPCOMING_POLL_INTERVAL);
        tokio::time::sleep(UPCOMING_POLL_INTERVAL + Duration::from_secs(1)).await;
        drop(handle);

        assert_eq!(transport.count(HttpMethod::Get, &format!("{BASE}/appointments")), 2);
    }
}
