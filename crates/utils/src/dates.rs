//! Calendar helpers. Every value here is a plain calendar date with no
//! time-of-day or timezone attached.

use chrono::{Datelike, Local, NaiveDate, ParseResult, Weekday};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Closed date range `[start, end]`. A range whose start is after its end is
/// empty rather than invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Every calendar date in the interval, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start
            .iter_days()
            .take_while(move |day| *day <= end)
    }

    /// Monday through Friday only.
    pub fn working_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.days().filter(|day| is_working_day(*day))
    }

    pub fn working_day_count(&self) -> usize {
        self.working_days().count()
    }
}

impl std::fmt::Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !is_weekend(date)
}

pub fn parse_date(value: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

/// Today's date on the operator's local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn test_working_days_skip_weekend() {
        // 2025-01-01 is a Wednesday, 2025-01-04/05 are Sat/Sun
        let interval = DateInterval::new(date("2025-01-01"), date("2025-01-05"));
        let days: Vec<_> = interval.working_days().collect();
        assert_eq!(
            days,
            vec![date("2025-01-01"), date("2025-01-02"), date("2025-01-03")]
        );
        assert_eq!(interval.days().count(), 5);
    }

    #[test]
    fn test_reversed_interval_is_empty() {
        let interval = DateInterval::new(date("2025-06-10"), date("2025-06-08"));
        assert!(interval.is_empty());
        assert_eq!(interval.days().count(), 0);
        assert_eq!(interval.working_day_count(), 0);
    }

    #[test]
    fn test_single_day_interval() {
        let monday = date("2025-06-09");
        assert_eq!(DateInterval::single(monday).working_day_count(), 1);
        let sunday = date("2025-06-08");
        assert_eq!(DateInterval::single(sunday).working_day_count(), 0);
    }

    #[test]
    fn test_weekend_only_interval() {
        let interval = DateInterval::new(date("2025-01-04"), date("2025-01-05"));
        assert!(!interval.is_empty());
        assert_eq!(interval.working_day_count(), 0);
    }

    #[test]
    fn test_full_reset_window_count() {
        // 2025-01-01 ..= 2025-10-16: 289 days, 207 of them Mon-Fri
        let interval = DateInterval::new(date("2025-01-01"), date("2025-10-16"));
        assert_eq!(interval.days().count(), 289);
        assert_eq!(interval.working_day_count(), 207);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(parse_date(" 2025-02-28 ").unwrap(), date("2025-02-28"));
    }

    #[test]
    fn test_display() {
        let interval = DateInterval::new(date("2025-01-01"), date("2025-01-31"));
        assert_eq!(interval.to_string(), "2025-01-01 to 2025-01-31");
    }
}
