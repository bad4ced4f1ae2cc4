//! Business-day resolution.
//!
//! This module provides calendar arithmetic over a [`HolidayCalendar`]: deciding
//! whether a date is a business day, counting business days in a range, and
//! moving a payment date onto a business day according to a [`PaymentDayRule`].

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::PaymentDayRule;
use crate::error::{EngineError, EngineResult};
use crate::models::HolidayCalendar;

/// Maximum number of days a business-day walk may move a date.
///
/// A longer run of weekends and holidays is treated as a calendar
/// configuration problem.
pub const MAX_BUSINESS_DAY_SCAN: u32 = 10;

/// Returns true if the date is neither a weekend day nor a holiday.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::is_business_day;
/// use payroll_engine::models::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::default();
/// // 2026-01-16 is a Friday, 2026-01-17 a Saturday
/// assert!(is_business_day(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(), &calendar));
/// assert!(!is_business_day(NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(), &calendar));
/// ```
pub fn is_business_day(date: NaiveDate, holidays: &HolidayCalendar) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.is_holiday(date)
}

/// Counts business days between two dates, both inclusive.
///
/// Returns zero when `end` is before `start`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, holidays: &HolidayCalendar) -> u32 {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d, holidays))
        .count() as u32
}

/// Moves a date onto a business day according to `rule`.
///
/// `Exact` returns the date unchanged. The other rules walk one day at a time
/// backward or forward, skipping weekends and holidays. A date that is already
/// a business day is returned as is.
///
/// # Errors
///
/// Returns [`EngineError::CalendarConfiguration`] if no business day is found
/// within [`MAX_BUSINESS_DAY_SCAN`] days.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::resolve_business_day;
/// use payroll_engine::config::PaymentDayRule;
/// use payroll_engine::models::{Holiday, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// // Saturday 2026-01-17; the Friday before is a holiday
/// let calendar = HolidayCalendar::new(vec![Holiday {
///     date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
///     name: "Company day".to_string(),
///     is_national: false,
/// }]);
/// let saturday = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
///
/// let resolved = resolve_business_day(saturday, PaymentDayRule::PreviousBusinessDay, &calendar).unwrap();
/// assert_eq!(resolved, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// ```
pub fn resolve_business_day(
    date: NaiveDate,
    rule: PaymentDayRule,
    holidays: &HolidayCalendar,
) -> EngineResult<NaiveDate> {
    let step: fn(NaiveDate) -> Option<NaiveDate> = match rule {
        PaymentDayRule::Exact => return Ok(date),
        PaymentDayRule::PreviousBusinessDay => |d| d.pred_opt(),
        PaymentDayRule::NextBusinessDay => |d| d.succ_opt(),
    };

    let exhausted = || EngineError::CalendarConfiguration {
        date,
        max_days: MAX_BUSINESS_DAY_SCAN,
    };

    let mut current = date;
    for _ in 0..=MAX_BUSINESS_DAY_SCAN {
        if is_business_day(current, holidays) {
            return Ok(current);
        }
        current = step(current).ok_or_else(exhausted)?;
    }

    Err(exhausted())
}
