use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A Monday-to-Sunday contest week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ContestWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ContestWeek {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - TimeDelta::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            start,
            end: start + TimeDelta::days(6),
        }
    }

    /// ISO week label, e.g. `2026-W42`.
    pub fn label(&self) -> String {
        let iso = self.start.iso_week();
        format!("{}-W{:02}", iso.year(), iso.week())
    }
}

/// Resolves instants to contest weeks in the fixed reference timezone.
#[derive(Debug, Clone, Copy)]
pub struct WeekClock {
    offset: FixedOffset,
}

impl WeekClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Returns `None` when `hours` is outside the valid UTC offset range.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub fn week_of(&self, now: DateTime<Utc>) -> ContestWeek {
        ContestWeek::containing(self.local_date(now))
    }
}

impl Default for WeekClock {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2026-10-16 is a Friday
        let week = ContestWeek::containing(date(2026, 10, 16));
        assert_eq!(week.start, date(2026, 10, 12));
        assert_eq!(week.end, date(2026, 10, 18));
    }

    #[test]
    fn test_monday_and_sunday_belong_to_same_week() {
        let monday = ContestWeek::containing(date(2026, 10, 12));
        let sunday = ContestWeek::containing(date(2026, 10, 18));
        assert_eq!(monday, sunday);
        assert_ne!(monday, ContestWeek::containing(date(2026, 10, 19)));
    }

    #[test]
    fn test_week_crossing_year_boundary() {
        let week = ContestWeek::containing(date(2027, 1, 1));
        assert_eq!(week.start, date(2026, 12, 28));
        assert_eq!(week.end, date(2027, 1, 3));
        assert_eq!(week.label(), "2026-W53");
    }

    #[test]
    fn test_label() {
        assert_eq!(ContestWeek::containing(date(2026, 10, 16)).label(), "2026-W42");
    }

    #[test]
    fn test_clock_uses_reference_offset() {
        // Sunday 22:30 UTC is already Monday at UTC+3
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 22, 30, 0).unwrap();

        let utc_week = WeekClock::utc().week_of(now);
        assert_eq!(utc_week.start, date(2026, 10, 12));

        let plus_three = WeekClock::from_utc_offset_hours(3).unwrap().week_of(now);
        assert_eq!(plus_three.start, date(2026, 10, 19));
    }

    #[test]
    fn test_invalid_offset_is_rejected() {
        assert!(WeekClock::from_utc_offset_hours(30).is_none());
        assert!(WeekClock::from_utc_offset_hours(-24).is_none());
        assert!(WeekClock::from_utc_offset_hours(1_000_000).is_none());
        assert!(WeekClock::from_utc_offset_hours(i32::MIN).is_none());
        assert!(WeekClock::from_utc_offset_hours(-23).is_some());
    }
}
