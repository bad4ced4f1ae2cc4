//! Payroll period and holiday models.
//!
//! This module contains the [`PayrollPeriod`], [`Holiday`] and
//! [`HolidayCalendar`] types that define the calendar context of a run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodType {
    /// First half of the month (days 1 to 15).
    #[serde(rename = "QUINCENA_1")]
    Quincena1,
    /// Second half of the month (day 16 to month end).
    #[serde(rename = "QUINCENA_2")]
    Quincena2,
    /// Whole month.
    #[serde(rename = "MONTHLY")]
    Monthly,
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodType::Quincena1 => write!(f, "QUINCENA_1"),
            PeriodType::Quincena2 => write!(f, "QUINCENA_2"),
            PeriodType::Monthly => write!(f, "MONTHLY"),
        }
    }
}

/// Represents a payroll period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollPeriod, PeriodType};
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod {
///     period_type: PeriodType::Monthly,
///     year: 2026,
///     month: 1,
///     period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///     payment_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
///     business_days: 21,
///     is_closed: false,
/// };
///
/// assert_eq!(period.length_days(), 31);
/// assert_eq!(period.label(), "2026-01 MONTHLY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// The kind of period.
    pub period_type: PeriodType,
    /// Calendar year of the period.
    pub year: i32,
    /// Calendar month of the period (1-12).
    pub month: u32,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Nominal payment date, before business-day resolution.
    pub payment_date: NaiveDate,
    /// Number of business days in the period.
    pub business_days: u32,
    /// Closed periods accept no new results.
    #[serde(default)]
    pub is_closed: bool,
}

impl PayrollPeriod {
    /// Number of calendar days in the period, both ends inclusive.
    /// Returns zero for an inverted range.
    pub fn length_days(&self) -> i64 {
        ((self.period_end - self.period_start).num_days() + 1).max(0)
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// A short human-readable identifier, e.g. `2026-01 QUINCENA_2`.
    pub fn label(&self) -> String {
        format!("{}-{:02} {}", self.year, self.month, self.period_type)
    }
}

/// Represents a holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// Whether the holiday is national (as opposed to regional).
    #[serde(default)]
    pub is_national: bool,
}

/// An ordered set of holidays, keyed by date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Holiday, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::new(vec![Holiday {
///     date: NaiveDate::from_ymd_opt(2026, 7, 9).unwrap(),
///     name: "Independence Day".to_string(),
///     is_national: true,
/// }]);
///
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 7, 9).unwrap()));
/// assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 7, 10).unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, Holiday>,
}

impl HolidayCalendar {
    /// Builds a calendar from a list of holidays. Later duplicates of a date
    /// replace earlier ones.
    pub fn new(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            holidays: holidays.into_iter().map(|h| (h.date, h)).collect(),
        }
    }

    /// Checks if a date is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Returns the holiday on a date, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.get(&date)
    }

    /// Iterates the holidays in date order.
    pub fn iter(&self) -> impl Iterator<Item = &Holiday> {
        self.holidays.values()
    }

    /// Number of distinct holiday dates.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Returns true if the calendar holds no holidays.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
