//! Serde adapter for appointment timestamps.
//!
//! Appointments are scheduled in clinic wall-clock time and written as
//! `YYYY-MM-DDTHH:MM:SS` without an offset. Reads are lenient: fractional
//! seconds are accepted, and RFC 3339 values with an offset are converted to
//! local wall-clock, the clock the schedule is compared against.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, SecondsFormat, Utc};

    fn nine_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 26)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_plain_wall_clock() {
        assert_eq!(parse("2024-08-26T09:00:00"), Some(nine_am()));
    }

    #[test]
    fn parses_fractional_seconds() {
        assert_eq!(parse("2024-08-26T09:00:00.000"), Some(nine_am()));
    }

    #[test]
    fn parses_minutes_only() {
        assert_eq!(parse("2024-08-26T09:00"), Some(nine_am()));
    }

    #[test]
    fn converts_offsets_to_local_wall_clock() {
        let expected = DateTime::parse_from_rfc3339("2024-08-26T09:00:00-03:00")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse("2024-08-26T09:00:00-03:00"), Some(expected));
        assert_eq!(parse("2024-08-26T12:00:00.000Z"), Some(expected));
    }

    #[test]
    fn offset_timestamps_order_against_local_now() {
        let now = Utc::now();
        let ahead = (now + Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let behind = (now - Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

        let local_now = Local::now().naive_local();
        assert!(parse(&ahead).unwrap() > local_now);
        assert!(parse(&behind).unwrap() < local_now);
    }

    #[test]
    fn rejects_dates_without_time() {
        assert_eq!(parse("2024-08-26"), None);
    }
}
