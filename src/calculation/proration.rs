//! Proration policy for partial periods.
//!
//! This module computes the fraction of a period an employee was employed,
//! used to scale prorate-eligible components and DAYS_BASED components.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Employee, PayrollPeriod};

/// Active days of an employee within a period.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::ProrationFactor;
/// use rust_decimal::Decimal;
///
/// let factor = ProrationFactor { active_days: 15, period_days: 30 };
/// assert_eq!(factor.fraction(), Decimal::new(5, 1));
/// assert!(factor.is_partial());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationFactor {
    /// Days the employee was employed within the period.
    pub active_days: i64,
    /// Calendar days in the period.
    pub period_days: i64,
}

impl ProrationFactor {
    /// A factor covering the whole period.
    pub fn full(period_days: i64) -> Self {
        Self {
            active_days: period_days,
            period_days,
        }
    }

    /// `active_days / period_days`, in `[0, 1]`. A zero-length period yields zero.
    pub fn fraction(&self) -> Decimal {
        if self.period_days <= 0 || self.active_days <= 0 {
            return Decimal::ZERO;
        }
        if self.active_days >= self.period_days {
            return Decimal::ONE;
        }
        Decimal::from(self.active_days) / Decimal::from(self.period_days)
    }

    /// Returns true if the employee was active for only part of the period.
    pub fn is_partial(&self) -> bool {
        self.active_days < self.period_days
    }
}

/// Computes the proration factor of an employee in a period.
///
/// The active range is `[hire_date, termination_date or period_end]`,
/// intersected with `[period_start, period_end]`. Both ends are inclusive and
/// an empty intersection yields zero active days.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::proration_factor;
/// use payroll_engine::models::{Employee, PayrollPeriod, PeriodType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     gross_salary: Decimal::new(50000, 0),
///     hire_date: NaiveDate::from_ymd_opt(2026, 4, 16).unwrap(),
///     termination_date: None,
///     is_active: true,
///     cost_center_id: None,
/// };
/// let period = PayrollPeriod {
///     period_type: PeriodType::Monthly,
///     year: 2026,
///     month: 4,
///     period_start: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
///     payment_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
///     business_days: 22,
///     is_closed: false,
/// };
///
/// let factor = proration_factor(&employee, &period);
/// assert_eq!(factor.active_days, 15);
/// assert_eq!(factor.fraction(), Decimal::new(5, 1));
/// ```
pub fn proration_factor(employee: &Employee, period: &PayrollPeriod) -> ProrationFactor {
    let period_days = period.length_days();

    let start = employee.hire_date.max(period.period_start);
    let end = employee
        .termination_date
        .unwrap_or(period.period_end)
        .min(period.period_end);

    let active_days = ((end - start).num_days() + 1).clamp(0, period_days);

    ProrationFactor {
        active_days,
        period_days,
    }
}
