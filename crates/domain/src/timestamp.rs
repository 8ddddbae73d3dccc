// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp handling and the business calendar.
//!
//! Everything is persisted as UTC text in a fixed format so string
//! comparison in SQL matches chronological order on every backend.
//! Clients may send local wall-clock times; those are resolved in the
//! business timezone.

use crate::error::DomainError;
use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc, Weekday,
};
use chrono_tz::Tz;

/// Storage format for every timestamp column.
pub const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Formats a UTC instant in the storage format.
#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(STORED_TIMESTAMP_FORMAT).to_string()
}

/// Parses a value previously written with [`format_timestamp`].
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if the value is not in the
/// storage format.
pub fn parse_stored_timestamp(value: &str) -> Result<DateTime<Utc>, DomainError> {
    NaiveDateTime::parse_from_str(value, STORED_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Timezone and working hours used for local-time input and phase planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    tz: Tz,
    workday_start_hour: u32,
    workday_end_hour: u32,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Chicago,
            workday_start_hour: 7,
            workday_end_hour: 16,
        }
    }
}

impl BusinessCalendar {
    /// Creates a calendar from an IANA timezone name and workday hours.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or the hours do not
    /// describe a non-empty span within one day.
    pub fn new(
        timezone: &str,
        workday_start_hour: u32,
        workday_end_hour: u32,
    ) -> Result<Self, DomainError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;

        if workday_end_hour > 24 || workday_start_hour >= workday_end_hour {
            return Err(DomainError::InvalidWorkdayHours {
                start_hour: workday_start_hour,
                end_hour: workday_end_hour,
            });
        }

        Ok(Self {
            tz,
            workday_start_hour,
            workday_end_hour,
        })
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    #[must_use]
    pub const fn workday_start_hour(&self) -> u32 {
        self.workday_start_hour
    }

    #[must_use]
    pub const fn workday_end_hour(&self) -> u32 {
        self.workday_end_hour
    }

    /// Parses a client-supplied timestamp.
    ///
    /// Accepts RFC 3339 with an offset, a naive `YYYY-MM-DDTHH:MM[:SS]`
    /// local time, or a bare `YYYY-MM-DD` date meaning local midnight.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimestamp` if no format matches, or
    /// `DomainError::NonexistentLocalTime` for a wall-clock time skipped
    /// by a DST change.
    pub fn parse_client_timestamp(&self, value: &str) -> Result<DateTime<Utc>, DomainError> {
        let trimmed = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return self.resolve_local(naive);
            }
        }

        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => self.resolve_local(date.and_time(NaiveTime::MIN)),
            Err(e) => Err(DomainError::InvalidTimestamp {
                value: value.to_string(),
                error: e.to_string(),
            }),
        }
    }

    /// Converts a local wall-clock time in the business timezone to UTC.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonexistentLocalTime` for skipped times.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, DomainError> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            LocalResult::None => Err(DomainError::NonexistentLocalTime {
                local: naive.to_string(),
            }),
        }
    }

    /// The calendar date of an instant in the business timezone.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Start and end of the working day on `date`, in UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if either boundary falls in a DST gap.
    pub fn workday_window(
        &self,
        date: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
        let midnight = date.and_time(NaiveTime::MIN);
        let start = midnight + TimeDelta::hours(i64::from(self.workday_start_hour));
        let end = midnight + TimeDelta::hours(i64::from(self.workday_end_hour));
        Ok((self.resolve_local(start)?, self.resolve_local(end)?))
    }
}

/// Monday through Friday.
#[must_use]
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day on or after `date`.
#[must_use]
pub fn roll_forward_to_business_day(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while !is_business_day(current) {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Walks back `days` business days from `date`, skipping weekends.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if the walk leaves chrono's
/// supported date range.
pub fn subtract_business_days(date: NaiveDate, days: u32) -> Result<NaiveDate, DomainError> {
    let mut current = date;
    let mut remaining = days;
    while remaining > 0 {
        current = current
            .pred_opt()
            .ok_or_else(|| DomainError::InvalidTimestamp {
                value: date.to_string(),
                error: String::from("date out of range"),
            })?;
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    Ok(current)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stored_format_round_trip() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 2, 13, 5, 9).unwrap();
        let text = format_timestamp(instant);
        assert_eq!(text, "2026-03-02T13:05:09Z");
        assert_eq!(parse_stored_timestamp(&text), Ok(instant));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let calendar = BusinessCalendar::default();
        let parsed = calendar
            .parse_client_timestamp("2026-03-02T08:00:00-06:00")
            .unwrap();
        assert_eq!(format_timestamp(parsed), "2026-03-02T14:00:00Z");
    }

    #[test]
    fn test_parse_naive_local_uses_business_timezone() {
        let calendar = BusinessCalendar::default();
        // Chicago is UTC-6 in early March before DST.
        let parsed = calendar.parse_client_timestamp("2026-03-02T08:00").unwrap();
        assert_eq!(format_timestamp(parsed), "2026-03-02T14:00:00Z");

        // And UTC-5 after DST starts.
        let parsed = calendar
            .parse_client_timestamp("2026-07-01T08:00:00")
            .unwrap();
        assert_eq!(format_timestamp(parsed), "2026-07-01T13:00:00Z");
    }

    #[test]
    fn test_parse_bare_date_is_local_midnight() {
        let calendar = BusinessCalendar::default();
        let parsed = calendar.parse_client_timestamp("2026-03-02").unwrap();
        assert_eq!(format_timestamp(parsed), "2026-03-02T06:00:00Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let calendar = BusinessCalendar::default();
        assert!(matches!(
            calendar.parse_client_timestamp("next tuesday"),
            Err(DomainError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_dst_gap_is_rejected() {
        let calendar = BusinessCalendar::default();
        // 2026-03-08 02:30 does not exist in Chicago.
        assert!(matches!(
            calendar.parse_client_timestamp("2026-03-08T02:30"),
            Err(DomainError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn test_dst_fall_back_resolves_to_earlier_instant() {
        let calendar = BusinessCalendar::default();
        // 2026-11-01 01:30 happens twice in Chicago; the CDT reading wins.
        let parsed = calendar.parse_client_timestamp("2026-11-01T01:30").unwrap();
        assert_eq!(format_timestamp(parsed), "2026-11-01T06:30:00Z");
    }

    #[test]
    fn test_calendar_rejects_bad_configuration() {
        assert!(matches!(
            BusinessCalendar::new("Mars/Olympus", 7, 16),
            Err(DomainError::InvalidTimezone(_))
        ));
        assert!(matches!(
            BusinessCalendar::new("America/Chicago", 16, 7),
            Err(DomainError::InvalidWorkdayHours { .. })
        ));
        assert!(BusinessCalendar::new("America/Denver", 6, 24).is_ok());
    }

    #[test]
    fn test_subtract_business_days_skips_weekends() {
        // Monday 2026-03-09 minus one business day is Friday 2026-03-06.
        assert_eq!(
            subtract_business_days(date(2026, 3, 9), 1),
            Ok(date(2026, 3, 6))
        );
        assert_eq!(
            subtract_business_days(date(2026, 3, 9), 5),
            Ok(date(2026, 3, 2))
        );
        assert_eq!(
            subtract_business_days(date(2026, 3, 9), 0),
            Ok(date(2026, 3, 9))
        );
    }

    #[test]
    fn test_roll_forward_to_business_day() {
        assert_eq!(
            roll_forward_to_business_day(date(2026, 3, 7)),
            date(2026, 3, 9)
        );
        assert_eq!(
            roll_forward_to_business_day(date(2026, 3, 9)),
            date(2026, 3, 9)
        );
    }

    #[test]
    fn test_workday_window() {
        let calendar = BusinessCalendar::default();
        let (start, end) = calendar.workday_window(date(2026, 3, 2)).unwrap();
        assert_eq!(format_timestamp(start), "2026-03-02T13:00:00Z");
        assert_eq!(format_timestamp(end), "2026-03-02T22:00:00Z");
    }
}
