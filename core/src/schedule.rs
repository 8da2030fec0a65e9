//! Calendar arithmetic behind the weekly agenda and the upcoming list.
//!
//! Everything here is pure: callers pass `now` and the week start, so the
//! derived queries and their tests agree on the same clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::types::Appointment;

/// Maximum number of entries in the upcoming list.
pub const UPCOMING_LIMIT: usize = 10;

pub const DAY_START_HOUR: u32 = 8;
pub const DAY_END_HOUR: u32 = 18;
pub const SLOT_MINUTES: i64 = 30;

/// First and last day of the week containing `date`.
pub fn week_bounds(date: NaiveDate, week_starts_on: Weekday) -> (NaiveDate, NaiveDate) {
    let offset = (7 + date.weekday().num_days_from_monday() - week_starts_on.num_days_from_monday()) % 7;
    let start = date - Duration::days(i64::from(offset));
    (start, start + Duration::days(6))
}

/// Inclusive bounds of that week: first day at midnight through the last
/// millisecond of the last day.
pub fn week_range(date: NaiveDate, week_starts_on: Weekday) -> (NaiveDateTime, NaiveDateTime) {
    let (start, end) = week_bounds(date, week_starts_on);
    (start.and_time(NaiveTime::MIN), end_of_day(end))
}

pub fn week_days(date: NaiveDate, week_starts_on: Weekday) -> [NaiveDate; 7] {
    let (start, _) = week_bounds(date, week_starts_on);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1)
}

/// Appointments scheduled within the week containing `date`, in the order
/// given.
pub fn filter_week(
    appointments: &[Appointment],
    date: NaiveDate,
    week_starts_on: Weekday,
) -> Vec<Appointment> {
    let (start, end) = week_range(date, week_starts_on);
    appointments
        .iter()
        .filter(|a| a.scheduled_date >= start && a.scheduled_date <= end)
        .cloned()
        .collect()
}

/// Appointments with `now <= scheduled <= now + days`, soonest first, at most
/// `limit` of them.
pub fn filter_upcoming(
    appointments: &[Appointment],
    now: NaiveDateTime,
    days: u32,
    limit: usize,
) -> Vec<Appointment> {
    let horizon = now + Duration::days(i64::from(days));
    let mut upcoming: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.scheduled_date >= now && a.scheduled_date <= horizon)
        .cloned()
        .collect();
    upcoming.sort_by_key(|a| a.scheduled_date);
    upcoming.truncate(limit);
    upcoming
}

/// Start times of the bookable slots: 08:00, 08:30, ... 17:30.
pub fn time_slots() -> Vec<NaiveTime> {
    (DAY_START_HOUR..DAY_END_HOUR)
        .flat_map(|hour| [0, SLOT_MINUTES as u32].map(move |minute| (hour, minute)))
        .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .collect()
}

/// One week of slots with the appointment occupying each, if any.
///
/// A cell holds the first appointment (in input order) that starts inside
/// its half hour. Overlaps are not resolved.
#[derive(Debug, Clone)]
pub struct WeekGrid {
    pub days: [NaiveDate; 7],
    pub slots: Vec<NaiveTime>,
    cells: Vec<Option<Appointment>>,
}

impl WeekGrid {
    pub fn new(date: NaiveDate, week_starts_on: Weekday, appointments: &[Appointment]) -> Self {
        let days = week_days(date, week_starts_on);
        let slots = time_slots();
        let mut cells = vec![None; days.len() * slots.len()];

        for appointment in appointments {
            let Some(day) = days.iter().position(|d| *d == appointment.scheduled_date.date()) else {
                continue;
            };
            let Some(slot) = slot_index(&slots, appointment.scheduled_date.time()) else {
                continue;
            };
            let cell = &mut cells[day * slots.len() + slot];
            if cell.is_none() {
                *cell = Some(appointment.clone());
            }
        }

        Self { days, slots, cells }
    }

    pub fn at(&self, day: NaiveDate, slot: NaiveTime) -> Option<&Appointment> {
        let day = self.days.iter().position(|d| *d == day)?;
        let slot = self.slots.iter().position(|s| *s == slot)?;
        self.cells[day * self.slots.len() + slot].as_ref()
    }

    pub fn is_free(&self, day: NaiveDate, slot: NaiveTime) -> bool {
        self.at(day, slot).is_none()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

fn slot_index(slots: &[NaiveTime], time: NaiveTime) -> Option<usize> {
    slots
        .iter()
        .position(|start| time >= *start && time < *start + Duration::minutes(SLOT_MINUTES))
}
