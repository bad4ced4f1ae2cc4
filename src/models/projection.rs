//! Projection output models.
//!
//! A [`ProjectionSummary`] forecasts upcoming payment obligations: the next
//! payment, one entry per projected payment slot, outstanding advances, and
//! alerts about configuration problems spotted along the way.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PeriodType;

/// The next payment obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPayment {
    /// Resolved payment date.
    pub date: NaiveDate,
    /// Expected cash outflow on that date.
    pub expected_outflow: Decimal,
}

/// One projected payment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedPayment {
    /// Calendar year of the period paid.
    pub year: i32,
    /// Calendar month of the period paid.
    pub month: u32,
    /// The kind of period paid.
    pub period_type: PeriodType,
    /// Payment date before business-day resolution.
    pub nominal_date: NaiveDate,
    /// Payment date after business-day resolution.
    pub payment_date: NaiveDate,
    /// Sum of net pay across active employees.
    pub payroll_outflow: Decimal,
    /// Sum of advance installments due in the period.
    pub advance_outflow: Decimal,
    /// `payroll_outflow + advance_outflow`.
    pub expected_outflow: Decimal,
    /// Number of employees whose pay was projected.
    pub employee_count: usize,
}

/// The next unpaid installment of an outstanding advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAdvance {
    /// The employee repaying the advance.
    pub employee_id: String,
    /// The advance identifier.
    pub advance_id: String,
    /// Amount of the next installment, bounded by the remaining balance.
    pub next_installment_amount: Decimal,
    /// Due date of the next installment.
    pub next_installment_date: NaiveDate,
    /// Balance still to be repaid.
    pub remaining_amount: Decimal,
}

/// The kind of projection alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// A payment date could not be moved onto a business day.
    UnresolvablePaymentDate,
    /// No payment falls within the projection horizon.
    NoUpcomingPayment,
    /// Projected outflow is well above the gross pay it should derive from.
    OutflowExceedsGross,
    /// One or more employee runs failed while projecting.
    ComputationFailed,
    /// An installment was due before the projection date and is still pending.
    OverdueInstallment,
    /// An installment carries a negative amount and was left out.
    InvalidInstallment,
}

/// A finding raised while projecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionAlert {
    /// The alert category.
    pub kind: AlertKind,
    /// A human-readable description.
    pub message: String,
}

/// Forward-looking payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    /// The date the projection was made for.
    pub as_of: NaiveDate,
    /// The earliest upcoming payment, if any.
    pub next_payment: Option<NextPayment>,
    /// Projected payments in date order.
    pub monthly_projection: Vec<ProjectedPayment>,
    /// Next installment of each outstanding advance.
    pub pending_advances: Vec<PendingAdvance>,
    /// Alerts raised while projecting.
    pub alerts: Vec<ProjectionAlert>,
}

impl ProjectionSummary {
    /// Returns true if any alert of the given kind was raised.
    pub fn has_alert(&self, kind: AlertKind) -> bool {
        self.alerts.iter().any(|a| a.kind == kind)
    }

    /// Sum of expected outflow across all projected payments.
    pub fn total_expected_outflow(&self) -> Decimal {
        self.monthly_projection
            .iter()
            .map(|p| p.expected_outflow)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(day: u32, outflow: i64) -> ProjectedPayment {
        let date = NaiveDate::from_ymd_opt(2026, 2, day).unwrap();
        ProjectedPayment {
            year: 2026,
            month: 2,
            period_type: PeriodType::Quincena1,
            nominal_date: date,
            payment_date: date,
            payroll_outflow: Decimal::new(outflow, 0),
            advance_outflow: Decimal::ZERO,
            expected_outflow: Decimal::new(outflow, 0),
            employee_count: 1,
        }
    }

    #[test]
    fn test_total_expected_outflow() {
        let summary = ProjectionSummary {
            as_of: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            next_payment: None,
            monthly_projection: vec![payment(13, 1000), payment(27, 1500)],
            pending_advances: vec![],
            alerts: vec![],
        };
        assert_eq!(summary.total_expected_outflow(), Decimal::new(2500, 0));
    }

    #[test]
    fn test_has_alert() {
        let summary = ProjectionSummary {
            as_of: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            next_payment: None,
            monthly_projection: vec![],
            pending_advances: vec![],
            alerts: vec![ProjectionAlert {
                kind: AlertKind::NoUpcomingPayment,
                message: "none".to_string(),
            }],
        };
        assert!(summary.has_alert(AlertKind::NoUpcomingPayment));
        assert!(!summary.has_alert(AlertKind::OverdueInstallment));
    }

    #[test]
    fn test_alert_kind_wire_value() {
        assert_eq!(
            serde_json::to_string(&AlertKind::OutflowExceedsGross).unwrap(),
            "\"OUTFLOW_EXCEEDS_GROSS\""
        );
    }
}
