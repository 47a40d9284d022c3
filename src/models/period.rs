//! Evaluation period and business-day calendar models.
//!
//! This module contains the [`EvaluationPeriod`] the benefit is purchased for
//! and the [`BusinessCalendar`] used to count business days inside it.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A non-working day on the authoritative calendar.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::Holiday;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
///     name: "Tiradentes".to_string(),
///     region: "national".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// Where the holiday applies (e.g., "national", "SP").
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "national".to_string()
}

/// Weekends plus a set of holidays.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::BusinessCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = BusinessCalendar::new([NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()]);
///
/// // Mon 2025-04-28 .. Fri 2025-05-02, with May Day off
/// let start = NaiveDate::from_ymd_opt(2025, 4, 28).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
/// assert_eq!(calendar.business_days_between(start, end), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    /// Creates a calendar with the given holidays.
    pub fn new<I: IntoIterator<Item = NaiveDate>>(holidays: I) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Creates a calendar from holiday definitions.
    pub fn from_holidays(holidays: &[Holiday]) -> Self {
        Self::new(holidays.iter().map(|h| h.date))
    }

    /// Returns the number of holidays on the calendar.
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    /// Checks whether a date is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Checks whether a date is a business day (Monday to Friday, not a holiday).
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// Counts business days in `[start, end]`, both ends inclusive.
    ///
    /// Returns 0 when `start` is after `end`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if start > end {
            return 0;
        }
        let count = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_business_day(*d))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// The window a benefit purchase covers, plus its termination cutoff.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::EvaluationPeriod;
/// use chrono::NaiveDate;
///
/// let period = EvaluationPeriod {
///     start: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
///     cutoff: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 5, 16).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPeriod {
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// Last day of the period (inclusive).
    pub end: NaiveDate,
    /// Terminations on or before this date exclude the employee.
    pub cutoff: NaiveDate,
}

impl EvaluationPeriod {
    /// Checks if a date falls within the period, both ends inclusive.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn may_2025_calendar() -> BusinessCalendar {
        BusinessCalendar::from_holidays(&[
            Holiday {
                date: date(2025, 4, 18),
                name: "Paixão de Cristo".to_string(),
                region: "national".to_string(),
            },
            Holiday {
                date: date(2025, 4, 21),
                name: "Tiradentes".to_string(),
                region: "national".to_string(),
            },
            Holiday {
                date: date(2025, 5, 1),
                name: "Dia do Trabalho".to_string(),
                region: "national".to_string(),
            },
        ])
    }

    #[test]
    fn test_weekends_are_not_business_days() {
        let calendar = BusinessCalendar::default();
        assert!(!calendar.is_business_day(date(2025, 4, 19))); // Saturday
        assert!(!calendar.is_business_day(date(2025, 4, 20))); // Sunday
        assert!(calendar.is_business_day(date(2025, 4, 22))); // Tuesday
    }

    #[test]
    fn test_holidays_are_not_business_days() {
        let calendar = may_2025_calendar();
        assert!(!calendar.is_business_day(date(2025, 5, 1)));
        assert!(calendar.is_holiday(date(2025, 4, 21)));
        assert_eq!(calendar.holiday_count(), 3);
    }

    #[test]
    fn test_weekday_only_count_for_reference_period() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.business_days_between(date(2025, 4, 15), date(2025, 5, 15)),
            23
        );
    }

    #[test]
    fn test_holiday_aware_count_for_reference_period() {
        let calendar = may_2025_calendar();
        assert_eq!(
            calendar.business_days_between(date(2025, 4, 15), date(2025, 5, 15)),
            20
        );
    }

    #[test]
    fn test_single_day_range() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.business_days_between(date(2025, 4, 22), date(2025, 4, 22)),
            1
        );
        assert_eq!(
            calendar.business_days_between(date(2025, 4, 19), date(2025, 4, 19)),
            0
        );
    }

    #[test]
    fn test_inverted_range_counts_zero() {
        let calendar = BusinessCalendar::default();
        assert_eq!(
            calendar.business_days_between(date(2025, 5, 15), date(2025, 4, 15)),
            0
        );
    }

    #[test]
    fn test_contains_date_on_boundaries() {
        let period = EvaluationPeriod {
            start: date(2025, 4, 15),
            end: date(2025, 5, 15),
            cutoff: date(2025, 5, 15),
        };
        assert!(period.contains_date(period.start));
        assert!(period.contains_date(period.end));
        assert!(!period.contains_date(date(2025, 4, 14)));
    }

    #[test]
    fn test_holiday_region_defaults_to_national() {
        let yaml = "date: 2025-11-20\nname: Consciência Negra\n";
        let holiday: Holiday = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(holiday.region, "national");
    }
}
